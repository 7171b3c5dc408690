//! Declarative controller manifest.
//!
//! Describes modules, controllers and actions in TOML so paths can be
//! resolved without compiling the application:
//!
//! ```toml
//! modules = ["admin"]
//!
//! [[controllers]]
//! name = "post"
//! module = "blog"
//! actions = { index = 1, edit = 1 }
//! private = { load = 1 }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::{DispatchContext, HandlerResult};
use crate::resolve::locator::{action_key, class_name, MethodInfo, TargetLocator};
use crate::resolve::registry::{ControllerDef, Registry};

/// Error type for manifest loading.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("controller {0} is declared twice")]
    Duplicate(String),

    #[error("{class}::{method} is declared both public and private")]
    Visibility { class: String, method: String },
}

/// Manifest file contents.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Manifest {
    /// Modules that exist even without controllers.
    pub modules: Vec<String>,

    pub controllers: Vec<ControllerManifest>,
}

/// One controller and its methods.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerManifest {
    pub name: String,

    #[serde(default)]
    pub module: Option<String>,

    /// Public actions and their parameter counts.
    #[serde(default)]
    pub actions: BTreeMap<String, usize>,

    /// Non-public methods and their parameter counts.
    #[serde(default)]
    pub private: BTreeMap<String, usize>,
}

impl Manifest {
    /// Parse a manifest from TOML.
    pub fn from_toml(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Index the manifest for lookups.
    pub fn into_locator(self) -> Result<ManifestLocator, ManifestError> {
        let mut modules: HashSet<String> = self.modules.iter().map(|m| m.to_lowercase()).collect();
        let mut controllers = HashMap::new();

        for controller in self.controllers {
            let module = controller
                .module
                .as_deref()
                .filter(|m| !m.is_empty())
                .map(str::to_lowercase);
            if let Some(module) = &module {
                modules.insert(module.clone());
            }

            let key = (module, controller.name.to_lowercase());
            let class = class_name(&key.1, key.0.as_deref());
            if controllers.contains_key(&key) {
                return Err(ManifestError::Duplicate(class));
            }

            let mut methods = HashMap::new();
            let declared = controller
                .actions
                .iter()
                .map(|(name, params)| (name, MethodInfo::public(*params)))
                .chain(controller.private.iter().map(|(name, params)| (name, MethodInfo::private(*params))));
            for (name, info) in declared {
                if methods.insert(action_key(name), info).is_some() {
                    return Err(ManifestError::Visibility {
                        class,
                        method: action_key(name),
                    });
                }
            }
            controllers.insert(key, methods);
        }

        Ok(ManifestLocator {
            modules,
            controllers,
        })
    }
}

#[derive(Default)]
struct Inspector;

fn echo(_: &mut Inspector, ctx: &mut DispatchContext, _: Vec<String>) -> HandlerResult {
    let body = serde_json::to_string_pretty(&ctx.snapshot())?;
    ctx.response.set_header("content-type", "application/json");
    ctx.response.write(&body);
    Ok(())
}

/// [`TargetLocator`] backed by a [`Manifest`].
#[derive(Debug, Clone, Default)]
pub struct ManifestLocator {
    modules: HashSet<String>,
    controllers: HashMap<(Option<String>, String), HashMap<String, MethodInfo>>,
}

impl ManifestLocator {
    /// Public actions of a controller with their parameter counts, sorted.
    pub fn actions(&self, module: Option<&str>, controller: &str) -> Vec<(String, usize)> {
        let mut actions: Vec<_> = self
            .controllers
            .get(&(module.map(str::to_lowercase), controller.to_lowercase()))
            .into_iter()
            .flatten()
            .filter(|(_, info)| info.is_public)
            .map(|(name, info)| (name.clone(), info.param_count))
            .collect();
        actions.sort_unstable();
        actions
    }

    /// A registry whose actions answer with the dispatch snapshot as JSON.
    ///
    /// Lets `serve` run against a manifest without application code, with
    /// exactly the modules, controllers and visibility this index reports.
    pub fn inspection_registry(&self) -> Registry {
        let mut registry = Registry::new();
        for module in &self.modules {
            registry.module(module);
        }
        for ((module, name), methods) in &self.controllers {
            let mut def = ControllerDef::<Inspector>::new(name.as_str());
            if let Some(module) = module {
                def = def.module(module.as_str());
            }
            for (action, info) in methods {
                def = if info.is_public {
                    def.action(action, info.param_count, echo)
                } else {
                    def.private_action(action, info.param_count)
                };
            }
            registry.register(def);
        }
        registry
    }

    /// Every declared controller as `(module, name)`, sorted.
    pub fn controllers(&self) -> Vec<(Option<String>, String)> {
        let mut keys: Vec<_> = self.controllers.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}

impl TargetLocator for ManifestLocator {
    fn module_exists(&self, module: &str) -> bool {
        self.modules.contains(&module.to_lowercase())
    }

    fn controller_exists(&self, controller: &str, module: Option<&str>) -> bool {
        self.controllers
            .contains_key(&(module.map(str::to_lowercase), controller.to_lowercase()))
    }

    fn method_info(&self, module: Option<&str>, controller: &str, action: &str) -> Option<MethodInfo> {
        self.controllers
            .get(&(module.map(str::to_lowercase), controller.to_lowercase()))?
            .get(&action_key(action))
            .copied()
    }
}
