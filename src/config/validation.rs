//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that dispatch defaults are present and well-formed
//! - Check that every route pattern compiles
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::routing::RouteRule;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("dispatch.{0} must not be empty")]
    MissingDefault(&'static str),

    #[error("dispatch.{field} `{value}` must not contain '/'")]
    InvalidName { field: &'static str, value: String },

    #[error("routes[{index}]: {message}")]
    InvalidRoute { index: usize, message: String },

    #[error("{field} `{value}` is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let dispatch = &config.dispatch;

    for (field, value) in [
        ("controller", &dispatch.controller),
        ("action", &dispatch.action),
        ("not_found_controller", &dispatch.not_found_controller),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::MissingDefault(field));
        }
    }

    for (field, value) in [
        ("module", &dispatch.module),
        ("controller", &dispatch.controller),
        ("action", &dispatch.action),
        ("not_found_controller", &dispatch.not_found_controller),
    ] {
        if value.contains('/') {
            errors.push(ValidationError::InvalidName {
                field,
                value: value.clone(),
            });
        }
    }

    for (index, route) in config.routes.iter().enumerate() {
        if let Err(e) = RouteRule::new(&route.pattern, &route.destination) {
            errors.push(ValidationError::InvalidRoute {
                index,
                message: e.to_string(),
            });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
