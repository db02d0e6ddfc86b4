//! The set of all units in one request.
//!
//! protoc sends every file reachable from the requested ones, so message
//! types declared in dependencies can be resolved even though no code is
//! generated for those files.

use crate::model::{MessageRef, ServiceDefinitionUnit};
use chanstub_core::{Error, Result};
use std::collections::HashMap;

/// All units of a request plus a message index over them.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    units: Vec<ServiceDefinitionUnit>,
    by_path: HashMap<String, usize>,
    messages: HashMap<String, MessageRef>,
}

impl DescriptorSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit and indexes its messages.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDescriptor` if a unit with the same path is
    /// already present.
    pub fn add_unit(&mut self, unit: ServiceDefinitionUnit) -> Result<()> {
        let path = unit.path.as_str().to_string();
        if self.by_path.contains_key(&path) {
            return Err(Error::MalformedDescriptor {
                unit: path,
                reason: "unit appears twice in the request".to_string(),
            });
        }

        for message in &unit.messages {
            self.messages
                .entry(message.full_name.clone())
                .or_insert_with(|| message.clone());
        }

        tracing::debug!(
            "indexed unit {} ({} services, {} messages)",
            path,
            unit.services.len(),
            unit.messages.len()
        );

        self.by_path.insert(path, self.units.len());
        self.units.push(unit);
        Ok(())
    }

    /// Looks up a unit by path.
    #[must_use]
    pub fn unit(&self, path: &str) -> Option<&ServiceDefinitionUnit> {
        self.by_path.get(path).map(|&idx| &self.units[idx])
    }

    /// Iterates over units in insertion order.
    pub fn units(&self) -> impl Iterator<Item = &ServiceDefinitionUnit> {
        self.units.iter()
    }

    /// Returns the number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if the set has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Resolves a message type name.
    ///
    /// Accepts both the protoc spelling with a leading dot (`.pkg.Msg`) and
    /// the bare fully-qualified name.
    #[must_use]
    pub fn resolve(&self, type_name: &str) -> Option<&MessageRef> {
        let name = type_name.strip_prefix('.').unwrap_or(type_name);
        self.messages.get(name)
    }
}
