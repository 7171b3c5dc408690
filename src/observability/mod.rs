//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, resolver, HTTP front end produce:
//!     → logging.rs (structured log events, one span per dispatch)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
