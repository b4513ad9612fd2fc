//! Material registry: descriptors of element types
//!
//! Materials tell the engine whether an element type is a container and
//! which types it accepts as dropped children. An element may carry its own
//! material, which takes precedence over the registered one.

use std::collections::HashMap;
use tango_types::{Element, Material};

/// Registry of materials keyed by element type
#[derive(Clone, Debug, Default)]
pub struct MaterialRegistry {
    materials: HashMap<String, Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material under its name, replacing any previous one
    pub fn register(&mut self, material: Material) -> Option<Material> {
        let name = material.name.clone();
        tracing::debug!(material = %name, "Material registered");
        self.materials.insert(name, material)
    }

    pub fn get(&self, element_type: &str) -> Option<&Material> {
        self.materials.get(element_type)
    }

    /// The material governing `element`: its own, else the registered one
    pub fn resolve<'a>(&'a self, element: &'a Element) -> Option<&'a Material> {
        element
            .material
            .as_ref()
            .or_else(|| self.materials.get(&element.element_type))
    }

    pub fn contains(&self, element_type: &str) -> bool {
        self.materials.contains_key(element_type)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn list(&self) -> Vec<&Material> {
        self.materials.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut registry = MaterialRegistry::new();
        assert!(registry.register(Material::container("Form")).is_none());
        assert!(registry.register(Material::new("Form")).is_some());
        assert_eq!(registry.len(), 1);
        assert!(!registry.get("Form").unwrap().is_container);
    }

    #[test]
    fn test_element_material_overrides_registry() {
        let mut registry = MaterialRegistry::new();
        registry.register(Material::new("Card"));

        let plain = Element::new("c1", "Card");
        assert!(!registry.resolve(&plain).unwrap().is_container);

        let custom = Element::new("c2", "Card").with_material(Material::container("Card"));
        assert!(registry.resolve(&custom).unwrap().is_container);

        let unknown = Element::new("x", "Unknown");
        assert!(registry.resolve(&unknown).is_none());
    }
}
