//! MVC route resolution and dispatch engine.
//!
//! Maps a request path onto a `(module, controller, action, args)` target
//! through configurable rewrite rules, a controller registry and a
//! precedence-ordered resolver, then runs the target with per-request
//! dispatch events and a 404 procedure.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http (axum) ──▶ routing (path source, route table)
//!                                          │
//!                                          ▼
//!                                     resolve (resolver + registry)
//!                                          │
//!                                          ▼
//!     Client Response ◀── http ◀──── dispatch (events, controller, 404)
//!
//!     Cross-cutting: config (TOML, reload) · observability · lifecycle
//! ```

pub mod config;
pub mod dispatch;
pub mod events;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolve;
pub mod routing;

pub use config::AppConfig;
pub use dispatch::{DispatchContext, DispatchError, DispatchReport, Dispatcher, Outcome, Response};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resolve::{ControllerDef, Registry, Resolution};
pub use routing::{Request, RouteTable};
