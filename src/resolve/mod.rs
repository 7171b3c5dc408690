//! Target resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Rewritten path
//!     → resolver.rs (precedence: empty path, root controller, module, defaults)
//!         → locator.rs queries (module / controller / method arity)
//!             ← registry.rs (compiled controllers)
//!             ← manifest.rs (declared in TOML, inspection only)
//!     → Resolution | RouteNotFound
//! ```

pub mod locator;
pub mod manifest;
pub mod registry;
pub mod resolver;

pub use locator::{class_name, MethodInfo, TargetLocator};
pub use manifest::{Manifest, ManifestError, ManifestLocator};
pub use registry::{Controller, ControllerDef, Registry};
pub use resolver::{Defaults, Resolution, Resolver, RouteNotFound};
