//! The 404 procedure.
//!
//! # Responsibilities
//! - Find a dedicated not-found controller, module scope first, then root
//! - Hand it the original URL, or fall back to the fixed 404 body
//!
//! # Design Decisions
//! - Never ends the process: the caller always receives a terminal response
//! - HEAD requests get the status without a body in the fallback

use crate::dispatch::context::DispatchContext;
use crate::dispatch::error::DispatchError;
use crate::dispatch::response::Response;
use crate::resolve::{Registry, Resolution, TargetLocator};

/// Locate a not-found controller whose default action takes the URL.
pub(crate) fn find_handler(
    registry: &Registry,
    controller: &str,
    action: &str,
    module: Option<&str>,
) -> Option<Resolution> {
    let scopes = module.into_iter().map(Some).chain(std::iter::once(None));
    for scope in scopes {
        let accepted = registry
            .method_info(scope, controller, action)
            .is_some_and(|info| info.accepts(1));
        if accepted {
            return Some(Resolution {
                module: scope.map(str::to_string),
                controller: controller.to_string(),
                action: action.to_string(),
                args: Vec::new(),
            });
        }
    }
    None
}

/// Produce the 404 response for `ctx`.
///
/// Returns the resolution of the not-found controller when one handled it.
pub(crate) fn respond(
    registry: &Registry,
    ctx: &mut DispatchContext,
    controller: &str,
    action: &str,
    attempted_module: Option<&str>,
) -> Result<Option<Resolution>, DispatchError> {
    let url = ctx.request().url().to_string();

    let Some(mut target) = find_handler(registry, controller, action, attempted_module) else {
        tracing::warn!(url = %url, "No not-found controller, sending fixed 404");
        ctx.response = Response::not_found(&url, ctx.request().is_head());
        return Ok(None);
    };

    let class = target.class_name();
    tracing::warn!(url = %url, class = %class, "Dispatching to not-found controller");

    target.args = vec![url];
    ctx.set_resolution(target.clone());
    ctx.response.set_status(404);

    let mut instance = registry
        .instantiate(target.module(), &target.controller, ctx)
        .map_err(|source| DispatchError::Instantiation {
            class: class.clone(),
            source,
        })?;
    instance
        .call(&target.action, target.args.clone(), ctx)
        .map_err(|source| DispatchError::Handler {
            class,
            action: target.action.clone(),
            source,
        })?;

    if ctx.request().is_head() {
        ctx.response.clear_body();
    }
    Ok(Some(target))
}
