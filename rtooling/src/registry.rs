//! Insertion-ordered catalog of tool descriptors.
//!
//! ```rust
//! use rtooling::{RegistryErrorKind, ToolDescriptor, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register(ToolDescriptor::new("get_employee_count", "Counts employees"))
//!     .expect("first registration");
//!
//! let duplicate = registry
//!     .register(ToolDescriptor::new("get_employee_count", "Again"))
//!     .expect_err("duplicate name");
//! assert_eq!(duplicate.kind, RegistryErrorKind::DuplicateTool);
//! assert!(registry.lookup("get_employee_count").is_ok());
//! ```

use rcommon::OrderedRegistry;
use rprovider::ToolDefinition;

use crate::{RegistryError, ToolDescriptor};

/// Built once while composing a server, then shared read-only behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    descriptors: OrderedRegistry<String, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ToolDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), RegistryError> {
        let name = descriptor.name.clone();
        self.descriptors
            .try_insert(name, descriptor)
            .map_err(|rejected| RegistryError::duplicate(rejected.name))
    }

    /// Descriptors in registration order. Each call starts a fresh pass.
    pub fn list(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.descriptors.values()
    }

    pub fn lookup(&self, name: &str) -> Result<&ToolDescriptor, RegistryError> {
        self.descriptors
            .get(name)
            .ok_or_else(|| RegistryError::unknown(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.list().map(ToolDescriptor::to_definition).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParameterSpec, ParameterType, RegistryErrorKind};

    fn descriptor(name: &str) -> ToolDescriptor {
        ToolDescriptor::new(name, format!("{name} tool")).parameter(ParameterSpec::optional(
            "max_results",
            ParameterType::Integer,
            "limit",
        ))
    }

    #[test]
    fn lookup_returns_registered_descriptor_exactly() {
        let registered = descriptor("get_unread_emails");
        let mut registry = ToolRegistry::new();
        registry.register(registered.clone()).expect("register");

        assert_eq!(registry.lookup("get_unread_emails"), Ok(&registered));
    }

    #[test]
    fn lookup_of_unregistered_name_fails() {
        let registry = ToolRegistry::from_descriptors([descriptor("a")]).expect("registry");
        let error = registry.lookup("b").expect_err("unknown");
        assert_eq!(error.kind, RegistryErrorKind::UnknownTool);
        assert_eq!(error.name, "b");
    }

    #[test]
    fn duplicate_registration_keeps_original() {
        let mut registry = ToolRegistry::new();
        registry.register(descriptor("a")).expect("first");
        let error = registry
            .register(ToolDescriptor::new("a", "replacement"))
            .expect_err("duplicate");

        assert_eq!(error.kind, RegistryErrorKind::DuplicateTool);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.lookup("a").map(|found| found.description.as_str()),
            Ok("a tool")
        );
    }

    #[test]
    fn list_is_ordered_and_restartable() {
        let registry = ToolRegistry::from_descriptors(
            ["zeta", "alpha", "mid"].into_iter().map(descriptor),
        )
        .expect("registry");

        let first: Vec<_> = registry.list().map(|d| d.name.as_str()).collect();
        let second: Vec<_> = registry.list().map(|d| d.name.as_str()).collect();
        assert_eq!(first, vec!["zeta", "alpha", "mid"]);
        assert_eq!(first, second);
        assert_eq!(registry.definitions()[1].name, "alpha");
    }
}
