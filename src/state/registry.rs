//! Named timer registry
//!
//! Owns the ordered set of timer engines. Display order is creation order;
//! names are unique and double as persistence key suffixes, so renaming is
//! deliberately not exposed.

use std::collections::HashMap;

use thiserror::Error;

use super::timer::TimerEngine;

/// Errors from registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Raised for an already-present name, and for the empty name
    #[error("timer name {0:?} is already taken or empty")]
    DuplicateName(String),
    #[error("no timer named {0:?}")]
    NotFound(String),
}

/// The set of named timer engines, in creation order
#[derive(Debug, Default)]
pub struct TimerRegistry {
    names: Vec<String>,
    engines: HashMap<String, TimerEngine>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timer names in creation order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Create a fresh idle timer under `name`
    pub fn create(&mut self, name: &str) -> Result<&TimerEngine, RegistryError> {
        if name.is_empty() || self.engines.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        self.names.push(name.to_string());
        Ok(self
            .engines
            .entry(name.to_string())
            .or_insert_with(|| TimerEngine::new(name)))
    }

    /// Remove the timer under `name`, returning its engine
    pub fn delete(&mut self, name: &str) -> Result<TimerEngine, RegistryError> {
        let engine = self
            .engines
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        self.names.retain(|n| n != name);
        Ok(engine)
    }

    pub fn engine(&self, name: &str) -> Result<&TimerEngine, RegistryError> {
        self.engines
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn engine_mut(&mut self, name: &str) -> Result<&mut TimerEngine, RegistryError> {
        self.engines
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Timer engines in creation order
    pub fn engines(&self) -> impl Iterator<Item = &TimerEngine> {
        self.names.iter().filter_map(|name| self.engines.get(name))
    }

    /// Re-attach an engine rebuilt from persisted records at startup.
    /// Empty or duplicate names in a tampered name list are skipped.
    pub fn restore(&mut self, engine: TimerEngine) {
        let name = engine.name().to_string();
        if name.is_empty() || self.engines.contains_key(&name) {
            tracing::warn!("Skipping restore of invalid timer name {:?}", name);
            return;
        }
        self.names.push(name.clone());
        self.engines.insert(name, engine);
    }
}
