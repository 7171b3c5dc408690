//! Dispatch event notifications.
//!
//! # Data Flow
//! ```text
//! Registry hooks (startup) ──┐
//! Controllers (per request) ─┴→ register(name, callback, bound args)
//!                                 → bus.rs (per-request registrations)
//! Dispatcher → fire(PreDispatch) → handler → fire(PostDispatch)
//!                                 → registrations consumed
//! ```
//!
//! # Design Decisions
//! - One bus per dispatch: nothing registered for one request can run in
//!   another
//! - Synchronous and single-threaded

pub mod bus;

pub use bus::{fire, Callback, EventArg, EventBus, EventHost, Firing};

/// Fired after resolution, before the controller is constructed.
pub const PRE_DISPATCH: &str = "PreDispatch";

/// Fired after the action returned.
pub const POST_DISPATCH: &str = "PostDispatch";
