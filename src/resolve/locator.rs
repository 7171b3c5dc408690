//! Target locator capability.
//!
//! # Responsibilities
//! - Answer whether a module or controller exists
//! - Describe an action: visibility and declared parameter count
//!
//! # Design Decisions
//! - Queried, never owned, by the resolver
//! - Names are matched case-insensitively; implementations key their
//!   lookups on [`class_name`]

/// Visibility and arity of a controller action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    pub is_public: bool,
    pub param_count: usize,
}

impl MethodInfo {
    pub fn public(param_count: usize) -> Self {
        Self {
            is_public: true,
            param_count,
        }
    }

    pub fn private(param_count: usize) -> Self {
        Self {
            is_public: false,
            param_count,
        }
    }

    /// Callable with exactly `remaining` positional arguments.
    pub fn accepts(&self, remaining: usize) -> bool {
        self.is_public && self.param_count == remaining
    }
}

/// Existence and arity checks used by the resolver.
pub trait TargetLocator: Send + Sync {
    /// Returns true if a module with this name exists.
    fn module_exists(&self, module: &str) -> bool;

    /// Returns true if the controller exists, at the root when `module` is None.
    fn controller_exists(&self, controller: &str, module: Option<&str>) -> bool;

    /// Describe an action on a controller, or None if it has no such method.
    fn method_info(&self, module: Option<&str>, controller: &str, action: &str) -> Option<MethodInfo>;
}

/// First letter uppercase, rest lowercase.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Qualified class name for a controller, e.g. `Module\Blog\Controller\Post`.
pub fn class_name(controller: &str, module: Option<&str>) -> String {
    match module {
        Some(module) => format!(
            "Module\\{}\\Controller\\{}",
            capitalize(module),
            capitalize(controller)
        ),
        None => format!("Controller\\{}", capitalize(controller)),
    }
}

/// Lookup key for an action name.
pub fn action_key(action: &str) -> String {
    action.to_lowercase()
}
