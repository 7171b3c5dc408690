//! Request dispatch.
//!
//! # Responsibilities
//! - Rewrite the request path through the route table
//! - Resolve it and run the 404 procedure when nothing matches
//! - Run module bootstraps, fire dispatch events, invoke the controller
//!
//! # Design Decisions
//! - One synchronous pass per request; the dispatcher itself is immutable
//!   and shared across concurrent dispatches
//! - Instantiation and handler failures end the dispatch and are returned,
//!   never retried
//! - Persistent hooks are seeded only once a target is resolved
//! - Registrations left after a successful dispatch are logged and dropped

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::config::AppConfig;
use crate::dispatch::context::DispatchContext;
use crate::dispatch::error::{ConfigurationError, DispatchError};
use crate::dispatch::not_found;
use crate::dispatch::response::Response;
use crate::events::{fire, POST_DISPATCH, PRE_DISPATCH};
use crate::observability::metrics;
use crate::resolve::{Defaults, Registry, Resolution, Resolver, RouteNotFound, TargetLocator};
use crate::routing::{Request, RequestBuilder, RouteTable};

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A resolved controller action ran.
    Handled(Resolution),
    /// Nothing matched. `handled_by` is the not-found controller, if any.
    NotFound { handled_by: Option<Resolution> },
}

impl Outcome {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Handled(_) => "handled",
            Outcome::NotFound { .. } => "not_found",
        }
    }
}

/// Result of a completed dispatch.
#[derive(Debug)]
pub struct DispatchReport {
    pub id: Uuid,
    pub outcome: Outcome,
    pub response: Response,
}

/// Routes requests to registered controllers.
#[derive(Debug)]
pub struct Dispatcher {
    routes: RouteTable,
    resolver: Resolver,
    registry: Arc<Registry>,
    not_found_controller: String,
    base_path: String,
}

impl Dispatcher {
    /// Build a dispatcher, checking that the defaults can be dispatched to.
    pub fn new(
        routes: RouteTable,
        defaults: Defaults,
        registry: Arc<Registry>,
    ) -> Result<Self, ConfigurationError> {
        if defaults.controller.is_empty() {
            return Err(ConfigurationError::EmptyDefault("controller"));
        }
        if defaults.action.is_empty() {
            return Err(ConfigurationError::EmptyDefault("action"));
        }

        let registered = registry.controller_exists(&defaults.controller, None)
            || defaults
                .default_module()
                .is_some_and(|module| registry.controller_exists(&defaults.controller, Some(module)));
        if !registered {
            return Err(ConfigurationError::MissingDefaultController {
                controller: defaults.controller.clone(),
            });
        }

        Ok(Self {
            routes,
            resolver: Resolver::new(defaults),
            registry,
            not_found_controller: "notfound".to_string(),
            base_path: String::new(),
        })
    }

    /// Build a dispatcher from the application configuration.
    pub fn from_config(config: &AppConfig, registry: Arc<Registry>) -> Result<Self, ConfigurationError> {
        let routes = RouteTable::from_config(&config.routes)?;
        let defaults = Defaults::from_config(&config.dispatch);
        let mut dispatcher = Self::new(routes, defaults, registry)?;
        dispatcher.not_found_controller = config.dispatch.not_found_controller.trim().to_string();
        dispatcher.base_path = config.dispatch.base_path.clone();

        tracing::info!(
            routes = dispatcher.routes.len(),
            controllers = dispatcher.registry.len(),
            "Dispatcher configured"
        );
        Ok(dispatcher)
    }

    /// Override the site base path.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn defaults(&self) -> &Defaults {
        self.resolver.defaults()
    }

    /// Start a request with the configured base path applied.
    pub fn request_builder(&self, method: impl Into<String>, raw_path: &str) -> RequestBuilder {
        Request::builder(method, raw_path).base_path(self.base_path.clone())
    }

    /// Rewrite and resolve a path without dispatching.
    pub fn resolve(&self, path: &str) -> Result<Resolution, RouteNotFound> {
        let path = self.routes.rewrite(path);
        self.resolver.resolve(&path, self.registry.as_ref())
    }

    /// Dispatch one request.
    pub fn dispatch(&self, request: Request) -> Result<DispatchReport, DispatchError> {
        let start = Instant::now();
        let mut ctx = DispatchContext::new(request);
        let span = tracing::info_span!(
            "dispatch",
            id = %ctx.id(),
            request_id = ctx.request().request_id().unwrap_or("-"),
            path = %ctx.path()
        );
        let _guard = span.enter();

        let result = self.run(&mut ctx);
        let leftover = ctx.events.pending_names();
        ctx.events.clear();
        if !leftover.is_empty() {
            if result.is_ok() {
                tracing::warn!(events = ?leftover, "Discarding unfired event registrations");
            } else {
                tracing::debug!(events = ?leftover, "Dropping registrations of failed dispatch");
            }
        }

        match result {
            Ok(outcome) => {
                metrics::record_dispatch(outcome.label(), start);
                tracing::debug!(
                    outcome = outcome.label(),
                    status = ctx.response.status(),
                    "Dispatch complete"
                );
                Ok(DispatchReport {
                    id: ctx.id(),
                    outcome,
                    response: ctx.into_response(),
                })
            }
            Err(err) => {
                metrics::record_dispatch("error", start);
                tracing::error!(class = %err.class(), error = %err, "Dispatch failed");
                Err(err)
            }
        }
    }

    fn run(&self, ctx: &mut DispatchContext) -> Result<Outcome, DispatchError> {
        let path = self.routes.rewrite(ctx.request().path());
        if path != ctx.request().path() {
            metrics::record_rewrite();
            ctx.set_path(path);
        }

        let target = match self.resolver.resolve(ctx.path(), self.registry.as_ref()) {
            Ok(target) => target,
            Err(missing) => {
                let defaults = self.resolver.defaults();
                let handled_by = not_found::respond(
                    &self.registry,
                    ctx,
                    &self.not_found_controller,
                    &defaults.action,
                    missing.attempted_module.as_deref(),
                )?;
                return Ok(Outcome::NotFound { handled_by });
            }
        };

        if let Some(module) = target.module() {
            self.registry.run_bootstrap(module);
        }

        // Persistent hooks only join dispatches that reach a controller
        self.registry.seed_hooks(&mut ctx.events);
        ctx.set_resolution(target.clone());
        let snapshot = ctx.snapshot();
        fire(ctx, PRE_DISPATCH, Some(snapshot));

        let class = target.class_name();
        let mut instance = self
            .registry
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

        let snapshot = ctx.snapshot();
        fire(ctx, POST_DISPATCH, Some(snapshot));

        if ctx.request().is_head() {
            ctx.response.clear_body();
        }
        Ok(Outcome::Handled(target))
    }
}
