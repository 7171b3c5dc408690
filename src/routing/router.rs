//! Route table lookup and rewriting.
//!
//! # Responsibilities
//! - Store compiled route rules in insertion order
//! - Rewrite a request path before resolution
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - Exact literal key match is tried before any regex
//! - First matching regex wins; the rewritten path is never re-routed

use std::collections::HashMap;

use crate::config::RouteConfig;
use crate::routing::matcher::{RouteError, RouteRule};

/// Ordered set of route rules.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    exact: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile all configured routes, failing on the first invalid pattern.
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, RouteError> {
        let mut table = Self::new();
        for route in routes {
            table.add_route(&route.pattern, &route.destination)?;
        }
        Ok(table)
    }

    /// Add a rule.
    ///
    /// Re-adding an existing pattern key replaces its destination and keeps
    /// its position.
    pub fn add_route(&mut self, pattern: &str, destination: &str) -> Result<(), RouteError> {
        let rule = RouteRule::new(pattern, destination)?;
        match self.exact.get(pattern) {
            Some(&index) => self.rules[index] = rule,
            None => {
                self.exact.insert(pattern.to_string(), self.rules.len());
                self.rules.push(rule);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite `path` using the first applicable rule.
    pub fn rewrite(&self, path: &str) -> String {
        if self.rules.is_empty() {
            return path.to_string();
        }

        if let Some(&index) = self.exact.get(path) {
            let rule = &self.rules[index];
            tracing::trace!(path = %path, destination = %rule.destination(), "Exact route match");
            return rule.destination().to_string();
        }

        match self.rules.iter().find(|rule| rule.matches(path)) {
            Some(rule) => {
                let rewritten = rule.apply(path);
                tracing::trace!(
                    path = %path,
                    pattern = %rule.pattern(),
                    rewritten = %rewritten,
                    "Pattern route match"
                );
                rewritten
            }
            None => path.to_string(),
        }
    }
}
