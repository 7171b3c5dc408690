//! Controller registry.
//!
//! # Responsibilities
//! - Hold every controller the application exposes, keyed by module and name
//! - Answer locator queries (existence, visibility, arity) without reflection
//! - Construct controllers and invoke their actions
//! - Run module bootstraps once per process
//! - Seed persistent hooks into each dispatch's event bus
//!
//! # Design Decisions
//! - Built once at startup, then shared read-only via Arc
//! - Controllers are typed; their actions are erased behind [`Controller`]
//! - Keys are lowercased so lookups are case-insensitive

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Once};

use crate::dispatch::context::DispatchContext;
use crate::dispatch::error::{HandlerError, HandlerResult};
use crate::events::{EventArg, EventBus};
use crate::resolve::locator::{action_key, class_name, MethodInfo, TargetLocator};

/// A constructed controller, ready to run one action.
pub trait Controller {
    /// Invoke `action` with exactly as many `args` as it declares.
    fn call(&mut self, action: &str, args: Vec<String>, ctx: &mut DispatchContext) -> HandlerResult;
}

type ActionFn<C> = Arc<dyn Fn(&mut C, &mut DispatchContext, Vec<String>) -> HandlerResult + Send + Sync>;
type FactoryFn<C> = Arc<dyn Fn(&mut DispatchContext) -> Result<C, HandlerError> + Send + Sync>;
type ErasedFactory = Box<dyn Fn(&mut DispatchContext) -> Result<Box<dyn Controller>, HandlerError> + Send + Sync>;
type HookFn = Arc<dyn Fn(&mut DispatchContext, Vec<EventArg>) + Send + Sync>;

/// Definition of a controller type `C` and its actions.
pub struct ControllerDef<C> {
    name: String,
    module: Option<String>,
    factory: FactoryFn<C>,
    actions: HashMap<String, (MethodInfo, Option<ActionFn<C>>)>,
}

impl<C: Default + 'static> ControllerDef<C> {
    /// A controller constructed with `C::default()`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_factory(name, |_| Ok(C::default()))
    }
}

impl<C: 'static> ControllerDef<C> {
    /// A controller constructed by `factory` for every dispatch.
    pub fn with_factory<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&mut DispatchContext) -> Result<C, HandlerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            module: None,
            factory: Arc::new(factory),
            actions: HashMap::new(),
        }
    }

    /// Scope the controller to a module.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        let module = module.into();
        self.module = (!module.is_empty()).then_some(module);
        self
    }

    /// A public action taking exactly `params` positional arguments.
    pub fn action<F>(mut self, name: &str, params: usize, handler: F) -> Self
    where
        F: Fn(&mut C, &mut DispatchContext, Vec<String>) -> HandlerResult + Send + Sync + 'static,
    {
        let handler: ActionFn<C> = Arc::new(handler);
        self.actions
            .insert(action_key(name), (MethodInfo::public(params), Some(handler)));
        self
    }

    /// A method that exists but cannot be dispatched to.
    pub fn private_action(mut self, name: &str, params: usize) -> Self {
        self.actions
            .insert(action_key(name), (MethodInfo::private(params), None));
        self
    }
}

/// Type-erased registry entry.
struct Entry {
    class: String,
    methods: HashMap<String, MethodInfo>,
    factory: ErasedFactory,
}

struct Bound<C> {
    instance: C,
    actions: Arc<HashMap<String, ActionFn<C>>>,
}

impl<C> Controller for Bound<C> {
    fn call(&mut self, action: &str, args: Vec<String>, ctx: &mut DispatchContext) -> HandlerResult {
        match self.actions.get(&action_key(action)) {
            Some(handler) => handler(&mut self.instance, ctx, args),
            None => Err(format!("action `{}` is not callable", action).into()),
        }
    }
}

struct Bootstrap {
    once: Once,
    run: Box<dyn Fn() + Send + Sync>,
}

type Key = (Option<String>, String);

fn key(module: Option<&str>, controller: &str) -> Key {
    (module.map(str::to_lowercase), controller.to_lowercase())
}

/// Every controller, module bootstrap and persistent hook of an application.
#[derive(Default)]
pub struct Registry {
    modules: HashSet<String>,
    controllers: HashMap<Key, Entry>,
    bootstraps: HashMap<String, Bootstrap>,
    hooks: Vec<(String, HookFn)>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<_> = self.controllers.values().map(|e| e.class.as_str()).collect();
        classes.sort_unstable();
        f.debug_struct("Registry")
            .field("modules", &self.modules)
            .field("controllers", &classes)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a module, even one without controllers.
    pub fn module(&mut self, name: &str) -> &mut Self {
        self.modules.insert(name.to_lowercase());
        self
    }

    /// Add a controller. A later definition with the same key replaces it.
    pub fn register<C: 'static>(&mut self, def: ControllerDef<C>) -> &mut Self {
        let class = class_name(&def.name, def.module.as_deref());
        if let Some(module) = &def.module {
            self.modules.insert(module.to_lowercase());
        }

        let methods = def.actions.iter().map(|(k, (info, _))| (k.clone(), *info)).collect();
        let actions: Arc<HashMap<String, ActionFn<C>>> = Arc::new(
            def.actions
                .into_iter()
                .filter_map(|(k, (_, handler))| handler.map(|h| (k, h)))
                .collect(),
        );
        let factory = def.factory;
        let erased: ErasedFactory = Box::new(move |ctx: &mut DispatchContext| {
            let instance = factory(ctx)?;
            Ok(Box::new(Bound {
                instance,
                actions: Arc::clone(&actions),
            }) as Box<dyn Controller>)
        });

        tracing::debug!(class = %class, "Controller registered");
        self.controllers.insert(
            key(def.module.as_deref(), &def.name),
            Entry {
                class,
                methods,
                factory: erased,
            },
        );
        self
    }

    /// Run `f` the first time a request is dispatched into `module`.
    pub fn bootstrap<F>(&mut self, module: &str, f: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let module = module.to_lowercase();
        self.modules.insert(module.clone());
        self.bootstraps.insert(
            module,
            Bootstrap {
                once: Once::new(),
                run: Box::new(f),
            },
        );
        self
    }

    /// A hook registered on `event` for every dispatch.
    pub fn hook<F>(&mut self, event: &str, f: F) -> &mut Self
    where
        F: Fn(&mut DispatchContext, Vec<EventArg>) + Send + Sync + 'static,
    {
        let hook: HookFn = Arc::new(f);
        self.hooks.push((event.to_string(), hook));
        self
    }

    /// Number of registered controllers.
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Qualified class names of all registered controllers, sorted.
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<_> = self.controllers.values().map(|e| e.class.clone()).collect();
        classes.sort_unstable();
        classes
    }

    /// Construct a controller for one dispatch.
    pub fn instantiate(
        &self,
        module: Option<&str>,
        controller: &str,
        ctx: &mut DispatchContext,
    ) -> Result<Box<dyn Controller>, HandlerError> {
        match self.controllers.get(&key(module, controller)) {
            Some(entry) => (entry.factory)(ctx),
            None => Err(format!("{} is not registered", class_name(controller, module)).into()),
        }
    }

    /// Run the module's bootstrap if it has one and it has not run yet.
    ///
    /// Returns true if the bootstrap ran during this call.
    pub fn run_bootstrap(&self, module: &str) -> bool {
        let Some(bootstrap) = self.bootstraps.get(&module.to_lowercase()) else {
            return false;
        };
        let mut ran = false;
        bootstrap.once.call_once(|| {
            tracing::info!(module = %module, "Running module bootstrap");
            (bootstrap.run)();
            ran = true;
        });
        ran
    }

    /// Register the persistent hooks on a fresh dispatch bus.
    pub fn seed_hooks(&self, bus: &mut EventBus<DispatchContext>) {
        for (event, hook) in &self.hooks {
            let hook = Arc::clone(hook);
            bus.register(event.clone(), move |ctx: &mut DispatchContext, args| hook(ctx, args), Vec::new());
        }
    }
}

impl TargetLocator for Registry {
    fn module_exists(&self, module: &str) -> bool {
        self.modules.contains(&module.to_lowercase())
    }

    fn controller_exists(&self, controller: &str, module: Option<&str>) -> bool {
        self.controllers.contains_key(&key(module, controller))
    }

    fn method_info(&self, module: Option<&str>, controller: &str, action: &str) -> Option<MethodInfo> {
        self.controllers
            .get(&key(module, controller))?
            .methods
            .get(&action_key(action))
            .copied()
    }
}
