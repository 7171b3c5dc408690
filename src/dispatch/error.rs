//! Dispatch error definitions.

use thiserror::Error;

use crate::routing::RouteError;

/// Error returned by controller factories and actions.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a controller action.
pub type HandlerResult = Result<(), HandlerError>;

/// Errors that end a dispatch.
///
/// An unresolvable path is not one of them: it is answered by the 404
/// procedure.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The resolved controller could not be constructed.
    #[error("failed to instantiate {class}: {source}")]
    Instantiation {
        class: String,
        #[source]
        source: HandlerError,
    },

    /// The invoked action returned an error.
    #[error("{class}::{action} failed: {source}")]
    Handler {
        class: String,
        action: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Qualified class name of the controller involved.
    pub fn class(&self) -> &str {
        match self {
            DispatchError::Instantiation { class, .. } | DispatchError::Handler { class, .. } => class,
        }
    }
}

/// Problems detected while building a dispatcher.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A route rule failed to compile.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The default controller is registered neither at the root nor in the
    /// default module.
    #[error("default controller `{controller}` is not registered")]
    MissingDefaultController { controller: String },

    /// A default name is empty.
    #[error("default {0} must not be empty")]
    EmptyDefault(&'static str),
}
