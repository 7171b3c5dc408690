//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query)
//!     → path.rs (normalize, strip base path)
//!     → router.rs (exact key lookup, then ordered regex scan)
//!     → matcher.rs (anchored match, backreference substitution)
//!     → Return: rewritten path handed to the resolver
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Compile patterns (case-insensitive, full-string)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always rewrites to the same path
//! - First match wins (insertion order)

pub mod matcher;
pub mod path;
pub mod router;

pub use matcher::{RouteError, RouteRule};
pub use path::{Request, RequestBuilder};
pub use router::RouteTable;
