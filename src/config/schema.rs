//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! dispatcher and its HTTP front end. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Default module, controller and action.
    pub dispatch: DispatchConfig,

    /// Route rules rewriting the request path, in evaluation order.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Dispatch defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Whether module scoping is enabled at all.
    pub modules: bool,

    /// Default module; empty means none.
    pub module: String,

    /// Default controller.
    pub controller: String,

    /// Default action.
    pub action: String,

    /// Controller looked up by the 404 procedure.
    pub not_found_controller: String,

    /// Site root prefix stripped from every request path.
    pub base_path: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            modules: true,
            module: String::new(),
            controller: "index".to_string(),
            action: "index".to_string(),
            not_found_controller: "notfound".to_string(),
            base_path: String::new(),
        }
    }
}

impl DispatchConfig {
    /// The default module, if one is configured and modules are enabled.
    pub fn default_module(&self) -> Option<&str> {
        let module = self.module.trim();
        (self.modules && !module.is_empty()).then_some(module)
    }
}

/// A route rule rewriting the request path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Literal path or regular expression matched against the whole path.
    pub pattern: String,

    /// Replacement path; `$1`-style references substitute capture groups.
    pub destination: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for dispatch and response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
