//! Path resolution.
//!
//! # Responsibilities
//! - Turn a rewritten path plus configured defaults into a dispatch target
//! - Apply the precedence: empty path, root controller, module, defaults
//! - Enforce exact arity on every candidate action
//!
//! # Design Decisions
//! - Pure lookup against the locator; no state survives a call
//! - Segments are consumed by slicing, so "pushing back" a segment is just
//!   retrying with the wider slice
//! - Arity is strict equality: an action declaring two parameters is never
//!   picked with one or three remaining segments
//! - Once the first segment names a module, the module branch is final

use serde::Serialize;
use thiserror::Error;

use crate::config::DispatchConfig;
use crate::resolve::locator::{class_name, TargetLocator};
use crate::routing::path::segments;

/// Configured default module, controller and action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub module: Option<String>,
    pub controller: String,
    pub action: String,
    pub modules_enabled: bool,
}

impl Defaults {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: None,
            controller: controller.into(),
            action: action.into(),
            modules_enabled: true,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        let module = module.into();
        self.module = (!module.is_empty()).then_some(module);
        self
    }

    pub fn with_modules_enabled(mut self, enabled: bool) -> Self {
        self.modules_enabled = enabled;
        self
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            module: config.default_module().map(str::to_string),
            controller: config.controller.trim().to_string(),
            action: config.action.trim().to_string(),
            modules_enabled: config.modules,
        }
    }

    /// The default module, only when module scoping is enabled.
    pub fn default_module(&self) -> Option<&str> {
        if self.modules_enabled {
            self.module.as_deref()
        } else {
            None
        }
    }
}

/// A concrete dispatch target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub module: Option<String>,
    pub controller: String,
    pub action: String,
    pub args: Vec<String>,
}

impl Resolution {
    fn new(module: Option<&str>, controller: &str, action: &str, args: &[String]) -> Self {
        Self {
            module: module.map(str::to_string),
            controller: controller.to_string(),
            action: action.to_string(),
            args: args.to_vec(),
        }
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Qualified controller class name.
    pub fn class_name(&self) -> String {
        class_name(&self.controller, self.module())
    }
}

/// No branch produced a public, arity-matching target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no dispatch target for path `{path}`")]
pub struct RouteNotFound {
    pub path: String,
    /// Module the path was scoped to, or the default module.
    pub attempted_module: Option<String>,
}

/// Resolves paths against a [`TargetLocator`].
#[derive(Debug, Clone)]
pub struct Resolver {
    defaults: Defaults,
}

impl Resolver {
    pub fn new(defaults: Defaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Resolve a normalized path.
    pub fn resolve<L>(&self, path: &str, locator: &L) -> Result<Resolution, RouteNotFound>
    where
        L: TargetLocator + ?Sized,
    {
        let parts = segments(path);
        let search = Search {
            defaults: &self.defaults,
            locator,
        };

        let found = if parts.is_empty() {
            search.empty_path()
        } else {
            search.segments(&parts)
        };

        match found {
            Ok(resolution) => {
                tracing::debug!(
                    path = %path,
                    class = %resolution.class_name(),
                    action = %resolution.action,
                    args = resolution.args.len(),
                    "Path resolved"
                );
                Ok(resolution)
            }
            Err(attempted_module) => {
                tracing::debug!(path = %path, "No dispatch target");
                Err(RouteNotFound {
                    path: path.to_string(),
                    attempted_module: attempted_module
                        .or_else(|| self.defaults.default_module().map(str::to_string)),
                })
            }
        }
    }
}

/// One resolution pass. `Err` carries the module the path was scoped to.
struct Search<'a, L: ?Sized> {
    defaults: &'a Defaults,
    locator: &'a L,
}

type Found = Result<Resolution, Option<String>>;

impl<L: TargetLocator + ?Sized> Search<'_, L> {
    fn empty_path(&self) -> Found {
        let controller = &self.defaults.controller;
        if self.locator.controller_exists(controller, None) {
            if let Some(found) = self.default_action(None, controller, &[]) {
                return Ok(found);
            }
        }

        if let Some(module) = self.defaults.default_module() {
            if self.locator.controller_exists(controller, Some(module)) {
                if let Some(found) = self.default_action(Some(module), controller, &[]) {
                    return Ok(found);
                }
            }
        }
        Err(None)
    }

    fn segments(&self, parts: &[String]) -> Found {
        let first = &parts[0];

        // Application controllers take priority over modules
        if self.locator.controller_exists(first, None) {
            if let Some(found) = self.action_or_default(None, first, &parts[1..]) {
                tracing::trace!(controller = %first, "Matched application controller");
                return Ok(found);
            }
        }

        if self.defaults.modules_enabled && self.locator.module_exists(first) {
            return self.module(first, &parts[1..]);
        }

        self.fallback(parts)
    }

    /// The path is scoped to `module`; `rest` follows the module segment.
    fn module(&self, module: &str, rest: &[String]) -> Found {
        if let Some((controller, after)) = rest.split_first() {
            if self.locator.controller_exists(controller, Some(module)) {
                if let Some(found) = self.action_or_default(Some(module), controller, after) {
                    return Ok(found);
                }
            }
        }

        // With no segments left only the default action can match
        let controller = &self.defaults.controller;
        if self.locator.controller_exists(controller, Some(module)) {
            if let Some(found) = self.action_or_default(Some(module), controller, rest) {
                return Ok(found);
            }
        }

        tracing::trace!(module = %module, "Module matched but no target found");
        Err(Some(module.to_string()))
    }

    /// Nothing claimed the first segment; fall back on the configured defaults.
    fn fallback(&self, parts: &[String]) -> Found {
        let controller = &self.defaults.controller;
        if self.locator.controller_exists(controller, None) {
            if let Some(found) = self.explicit_action(None, controller, parts) {
                return Ok(found);
            }
        }

        if let Some(module) = self.defaults.default_module() {
            let (first, after) = (&parts[0], &parts[1..]);
            if self.locator.controller_exists(first, Some(module)) {
                if let Some(found) = self.action_or_default(Some(module), first, after) {
                    return Ok(found);
                }
            }
            if self.locator.controller_exists(controller, Some(module)) {
                if let Some(found) = self.action_or_default(Some(module), controller, parts) {
                    return Ok(found);
                }
            }
        }
        Err(None)
    }

    /// The first remaining segment as action, else the default action.
    fn action_or_default(&self, module: Option<&str>, controller: &str, rest: &[String]) -> Option<Resolution> {
        self.explicit_action(module, controller, rest)
            .or_else(|| self.default_action(module, controller, rest))
    }

    fn explicit_action(&self, module: Option<&str>, controller: &str, rest: &[String]) -> Option<Resolution> {
        let (action, args) = rest.split_first()?;
        self.accepts(module, controller, action, args.len())
            .then(|| Resolution::new(module, controller, action, args))
    }

    fn default_action(&self, module: Option<&str>, controller: &str, args: &[String]) -> Option<Resolution> {
        let action = &self.defaults.action;
        self.accepts(module, controller, action, args.len())
            .then(|| Resolution::new(module, controller, action, args))
    }

    fn accepts(&self, module: Option<&str>, controller: &str, action: &str, remaining: usize) -> bool {
        self.locator
            .method_info(module, controller, action)
            .is_some_and(|info| info.accepts(remaining))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::resolve::locator::{action_key, MethodInfo};

    /// In-memory locator keyed on lowercased names.
    #[derive(Default)]
    struct StubLocator {
        modules: HashSet<String>,
        methods: HashMap<(Option<String>, String), HashMap<String, MethodInfo>>,
    }

    impl StubLocator {
        fn controller(mut self, module: Option<&str>, name: &str, actions: &[(&str, MethodInfo)]) -> Self {
            if let Some(module) = module {
                self.modules.insert(module.to_lowercase());
            }
            let entry = self
                .methods
                .entry((module.map(str::to_lowercase), name.to_lowercase()))
                .or_default();
            for (action, info) in actions {
                entry.insert(action_key(action), *info);
            }
            self
        }

        fn module(mut self, name: &str) -> Self {
            self.modules.insert(name.to_lowercase());
            self
        }
    }

    impl TargetLocator for StubLocator {
        fn module_exists(&self, module: &str) -> bool {
            self.modules.contains(&module.to_lowercase())
        }

        fn controller_exists(&self, controller: &str, module: Option<&str>) -> bool {
            self.methods
                .contains_key(&(module.map(str::to_lowercase), controller.to_lowercase()))
        }

        fn method_info(&self, module: Option<&str>, controller: &str, action: &str) -> Option<MethodInfo> {
            self.methods
                .get(&(module.map(str::to_lowercase), controller.to_lowercase()))?
                .get(&action_key(action))
                .copied()
        }
    }

    fn pub_(n: usize) -> MethodInfo {
        MethodInfo::public(n)
    }

    fn resolution(module: Option<&str>, controller: &str, action: &str, args: &[&str]) -> Resolution {
        Resolution {
            module: module.map(str::to_string),
            controller: controller.to_string(),
            action: action.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn home_defaults() -> Defaults {
        Defaults::new("home", "index")
    }

    #[test]
    fn test_empty_path_uses_default_controller() {
        let locator = StubLocator::default().controller(None, "home", &[("index", pub_(0))]);
        let resolver = Resolver::new(home_defaults());

        assert_eq!(
            resolver.resolve("", &locator).unwrap(),
            resolution(None, "home", "index", &[])
        );
    }

    #[test]
    fn test_empty_path_clears_default_module() {
        let locator = StubLocator::default()
            .controller(None, "home", &[("index", pub_(0))])
            .controller(Some("site"), "home", &[("index", pub_(0))]);
        let resolver = Resolver::new(home_defaults().with_module("site"));

        assert_eq!(resolver.resolve("", &locator).unwrap().module, None);
    }

    #[test]
    fn test_empty_path_falls_back_to_default_module() {
        let locator = StubLocator::default().controller(Some("site"), "home", &[("index", pub_(0))]);
        let resolver = Resolver::new(home_defaults().with_module("site"));

        assert_eq!(
            resolver.resolve("", &locator).unwrap(),
            resolution(Some("site"), "home", "index", &[])
        );
    }

    #[test]
    fn test_empty_path_requires_zero_arity() {
        let locator = StubLocator::default().controller(None, "home", &[("index", pub_(1))]);
        let resolver = Resolver::new(home_defaults());

        assert!(resolver.resolve("", &locator).is_err());
    }

    #[test]
    fn test_empty_path_ignores_private_default_action() {
        let locator =
            StubLocator::default().controller(None, "home", &[("index", MethodInfo::private(0))]);
        let resolver = Resolver::new(home_defaults());

        assert!(resolver.resolve("", &locator).is_err());
    }

    #[test]
    fn test_root_controller_explicit_action() {
        let locator = StubLocator::default().controller(
            None,
            "user",
            &[("index", pub_(0)), ("show", pub_(1))],
        );
        let resolver = Resolver::new(home_defaults());

        assert_eq!(
            resolver.resolve("user/show/5", &locator).unwrap(),
            resolution(None, "user", "show", &["5"])
        );
        assert_eq!(
            resolver.resolve("user", &locator).unwrap(),
            resolution(None, "user", "index", &[])
        );
    }

    #[test]
    fn test_root_controller_default_action_takes_args() {
        let locator = StubLocator::default().controller(None, "user", &[("index", pub_(1))]);
        let resolver = Resolver::new(home_defaults());

        assert_eq!(
            resolver.resolve("user/5", &locator).unwrap(),
            resolution(None, "user", "index", &["5"])
        );
    }

    #[test]
    fn test_arity_is_exact() {
        let locator = StubLocator::default().controller(None, "math", &[("add", pub_(2))]);
        let resolver = Resolver::new(home_defaults());

        assert!(resolver.resolve("math/add/1", &locator).is_err());
        assert!(resolver.resolve("math/add/1/2/3", &locator).is_err());
        assert_eq!(
            resolver.resolve("math/add/1/2", &locator).unwrap(),
            resolution(None, "math", "add", &["1", "2"])
        );
    }

    #[test]
    fn test_private_action_never_selected() {
        let locator = StubLocator::default().controller(
            None,
            "user",
            &[("index", pub_(1)), ("secret", MethodInfo::private(0))],
        );
        let resolver = Resolver::new(home_defaults());

        // "secret" is not callable, so it becomes the default action's argument
        assert_eq!(
            resolver.resolve("user/secret", &locator).unwrap(),
            resolution(None, "user", "index", &["secret"])
        );
    }

    #[test]
    fn test_names_match_case_insensitively() {
        let locator = StubLocator::default().controller(None, "user", &[("show", pub_(1))]);
        let resolver = Resolver::new(home_defaults());

        let found = resolver.resolve("USER/Show/5", &locator).unwrap();
        assert_eq!(found.controller, "USER");
        assert_eq!(found.class_name(), "Controller\\User");
    }

    #[test]
    fn test_module_controller_default_action_with_arg() {
        let locator = StubLocator::default().controller(Some("blog"), "post", &[("index", pub_(1))]);
        let resolver = Resolver::new(home_defaults());

        assert_eq!(
            resolver.resolve("blog/post/42", &locator).unwrap(),
            resolution(Some("blog"), "post", "index", &["42"])
        );
    }

    #[test]
    fn test_module_controller_explicit_action() {
        let locator = StubLocator::default().controller(
            Some("blog"),
            "post",
            &[("index", pub_(0)), ("edit", pub_(1))],
        );
        let resolver = Resolver::new(home_defaults());

        assert_eq!(
            resolver.resolve("blog/post/edit/3", &locator).unwrap(),
            resolution(Some("blog"), "post", "edit", &["3"])
        );
    }

    #[test]
    fn test_module_default_controller() {
        let locator = StubLocator::default().controller(
            Some("blog"),
            "home",
            &[("index", pub_(0)), ("archive", pub_(1))],
        );
        let resolver = Resolver::new(home_defaults());

        assert_eq!(
            resolver.resolve("blog", &locator).unwrap(),
            resolution(Some("blog"), "home", "index", &[])
        );
        assert_eq!(
            resolver.resolve("blog/archive/2011", &locator).unwrap(),
            resolution(Some("blog"), "home", "archive", &["2011"])
        );
    }

    #[test]
    fn test_module_controller_restored_for_default_controller() {
        // "post" exists but cannot take three args; the module's default
        // controller's default action can
        let locator = StubLocator::default()
            .controller(Some("blog"), "post", &[("index", pub_(0))])
            .controller(Some("blog"), "home", &[("index", pub_(3))]);
        let resolver = Resolver::new(home_defaults());

        assert_eq!(
            resolver.resolve("blog/post/a/b", &locator).unwrap(),
            resolution(Some("blog"), "home", "index", &["post", "a", "b"])
        );
    }

    #[test]
    fn test_module_branch_is_final() {
        // The root default controller has a matching "blog" action, but the
        // module claimed the path first
        let locator = StubLocator::default()
            .module("blog")
            .controller(None, "home", &[("blog", pub_(0))]);
        let resolver = Resolver::new(home_defaults());

        let err = resolver.resolve("blog", &locator).unwrap_err();
        assert_eq!(err.attempted_module.as_deref(), Some("blog"));
    }

    #[test]
    fn test_controller_reconsidered_as_module() {
        let locator = StubLocator::default()
            .controller(None, "admin", &[("index", pub_(0))])
            .controller(Some("admin"), "users", &[("index", pub_(1))]);
        let resolver = Resolver::new(home_defaults());

        assert_eq!(
            resolver.resolve("admin", &locator).unwrap(),
            resolution(None, "admin", "index", &[])
        );
        assert_eq!(
            resolver.resolve("admin/users/7", &locator).unwrap(),
            resolution(Some("admin"), "users", "index", &["7"])
        );
    }

    #[test]
    fn test_modules_disabled() {
        let locator = StubLocator::default().controller(Some("blog"), "post", &[("index", pub_(1))]);
        let resolver = Resolver::new(home_defaults().with_modules_enabled(false));

        assert!(resolver.resolve("blog/post/42", &locator).is_err());
    }

    #[test]
    fn test_fallback_to_default_controller_action() {
        let locator = StubLocator::default().controller(
            None,
            "home",
            &[("index", pub_(0)), ("about", pub_(0)), ("page", pub_(1))],
        );
        let resolver = Resolver::new(home_defaults());

        assert_eq!(
            resolver.resolve("about", &locator).unwrap(),
            resolution(None, "home", "about", &[])
        );
        assert_eq!(
            resolver.resolve("page/terms", &locator).unwrap(),
            resolution(None, "home", "page", &["terms"])
        );
    }

    #[test]
    fn test_unknown_segment_is_not_found() {
        let locator = StubLocator::default().controller(None, "home", &[("index", pub_(0))]);
        let resolver = Resolver::new(home_defaults());

        let err = resolver.resolve("nothing/here", &locator).unwrap_err();
        assert_eq!(err.path, "nothing/here");
        assert_eq!(err.attempted_module, None);
    }

    #[test]
    fn test_fallback_default_module_controller() {
        let locator = StubLocator::default()
            .controller(Some("site"), "contact", &[("index", pub_(0)), ("send", pub_(1))]);
        let resolver = Resolver::new(home_defaults().with_module("site"));

        assert_eq!(
            resolver.resolve("contact", &locator).unwrap(),
            resolution(Some("site"), "contact", "index", &[])
        );
        assert_eq!(
            resolver.resolve("contact/send/x", &locator).unwrap(),
            resolution(Some("site"), "contact", "send", &["x"])
        );
    }

    #[test]
    fn test_fallback_default_module_default_controller() {
        let locator = StubLocator::default()
            .controller(Some("site"), "home", &[("index", pub_(1)), ("faq", pub_(0))]);
        let resolver = Resolver::new(home_defaults().with_module("site"));

        assert_eq!(
            resolver.resolve("faq", &locator).unwrap(),
            resolution(Some("site"), "home", "faq", &[])
        );
        assert_eq!(
            resolver.resolve("hello", &locator).unwrap(),
            resolution(Some("site"), "home", "index", &["hello"])
        );

        let err = resolver.resolve("a/b", &locator).unwrap_err();
        assert_eq!(err.attempted_module.as_deref(), Some("site"));
    }

    #[test]
    fn test_defaults_from_config() {
        let config = DispatchConfig {
            module: " site ".into(),
            controller: "home".into(),
            ..DispatchConfig::default()
        };
        let defaults = Defaults::from_config(&config);
        assert_eq!(defaults.default_module(), Some("site"));
        assert_eq!(defaults.controller, "home");
        assert_eq!(defaults.action, "index");
    }
}
