//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → dispatcher.rs (rewrite, resolve)
//!         → not_found.rs (no target: 404 controller or fixed body)
//!     → bootstrap, PreDispatch
//!     → registry factory → controller action (writes context.rs response)
//!     → PostDispatch
//!     → DispatchReport
//! ```

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod not_found;
pub mod response;

pub use context::DispatchContext;
pub use dispatcher::{DispatchReport, Dispatcher, Outcome};
pub use error::{ConfigurationError, DispatchError, HandlerError, HandlerResult};
pub use response::Response;
