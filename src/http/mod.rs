//! HTTP front end.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum, request id, trace, timeout)
//!     → request.rs (method, path, query, host → dispatch Request)
//!     → Dispatcher::dispatch on a blocking worker
//!     → response.rs (dispatch Response or 500)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, to_dispatch_request, X_REQUEST_ID};
pub use response::internal_error;
pub use server::{AppState, HttpServer};
