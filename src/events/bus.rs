//! One-shot event bus.
//!
//! # Responsibilities
//! - Keep named registrations in registration order
//! - Fire a name: run every registration once, then forget them
//!
//! # Design Decisions
//! - Firing snapshots and clears the registrations before running them, so
//!   a callback registering the same name is only seen by the next firing
//! - The bus is owned by its host (the per-request dispatch context), and
//!   callbacks receive the host mutably
//! - Callbacks are `FnOnce`: a registration is consumed by its firing

use std::collections::HashMap;
use std::fmt;

/// Argument passed to event callbacks.
pub type EventArg = serde_json::Value;

/// A registered callback.
pub type Callback<H> = Box<dyn FnOnce(&mut H, Vec<EventArg>)>;

struct Registration<H> {
    callback: Callback<H>,
    bound_args: Vec<EventArg>,
}

/// Named one-shot registrations for a host of type `H`.
pub struct EventBus<H> {
    registrations: HashMap<String, Vec<Registration<H>>>,
}

impl<H> Default for EventBus<H> {
    fn default() -> Self {
        Self {
            registrations: HashMap::new(),
        }
    }
}

impl<H> fmt::Debug for EventBus<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending: Vec<_> = self
            .registrations
            .iter()
            .map(|(name, regs)| (name.as_str(), regs.len()))
            .collect();
        pending.sort_unstable();
        f.debug_struct("EventBus").field("pending", &pending).finish()
    }
}

impl<H> EventBus<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for the next firing of `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, callback: F, bound_args: Vec<EventArg>)
    where
        F: FnOnce(&mut H, Vec<EventArg>) + 'static,
    {
        self.registrations
            .entry(name.into())
            .or_default()
            .push(Registration {
                callback: Box::new(callback),
                bound_args,
            });
    }

    /// Drop every registration for `name`, returning how many there were.
    pub fn unregister(&mut self, name: &str) -> usize {
        self.registrations.remove(name).map_or(0, |regs| regs.len())
    }

    /// Number of registrations waiting on `name`.
    pub fn pending(&self, name: &str) -> usize {
        self.registrations.get(name).map_or(0, Vec::len)
    }

    /// True when no registration is waiting on any name.
    pub fn is_drained(&self) -> bool {
        self.registrations.values().all(Vec::is_empty)
    }

    /// Names with at least one pending registration.
    pub fn pending_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .registrations
            .iter()
            .filter(|(_, regs)| !regs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    /// Drop all registrations, returning how many there were.
    pub fn clear(&mut self) -> usize {
        self.registrations.drain().map(|(_, regs)| regs.len()).sum()
    }

    /// Remove the registrations for `name` so they can be run.
    pub fn take(&mut self, name: &str) -> Firing<H> {
        Firing {
            name: name.to_string(),
            registrations: self.registrations.remove(name).unwrap_or_default(),
        }
    }
}

/// Registrations removed from the bus by [`EventBus::take`].
#[must_use = "a firing does nothing unless run"]
pub struct Firing<H> {
    name: String,
    registrations: Vec<Registration<H>>,
}

impl<H> Firing<H> {
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Invoke every registration in order, appending `extra` to its bound args.
    pub fn run(self, host: &mut H, extra: Option<EventArg>) -> usize {
        let count = self.registrations.len();
        if count > 0 {
            tracing::trace!(event = %self.name, registrations = count, "Firing event");
        }
        for registration in self.registrations {
            let mut args = registration.bound_args;
            if let Some(extra) = &extra {
                args.push(extra.clone());
            }
            (registration.callback)(host, args);
        }
        count
    }
}

/// A value that owns an [`EventBus`] over itself.
pub trait EventHost: Sized {
    fn events(&mut self) -> &mut EventBus<Self>;
}

/// Fire `name` on `host`, returning how many callbacks ran.
pub fn fire<H: EventHost>(host: &mut H, name: &str, extra: Option<EventArg>) -> usize {
    let firing = host.events().take(name);
    firing.run(host, extra)
}
