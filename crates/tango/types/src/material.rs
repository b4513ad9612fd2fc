//! Materials: editor descriptors for element types

use crate::ContextConfig;
use serde::{Deserialize, Serialize};

/// Descriptor pairing an element type with its editor metadata
///
/// A material is a drop target when it declares itself a container, or when
/// its `drop_types` list names the dragged element's type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Element type this material describes
    pub name: String,
    /// Display title in the palette
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Accepts any element as a child
    #[serde(default, rename = "isContainer")]
    pub is_container: bool,
    /// Element types accepted as children
    #[serde(default, rename = "dropTypes", skip_serializing_if = "Vec::is_empty")]
    pub drop_types: Vec<String>,
    /// Values elements of this type publish
    #[serde(
        default,
        rename = "contextConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub context_config: Option<ContextConfig>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A container material accepting every element type
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_container: true,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_drop_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context_config(mut self, config: ContextConfig) -> Self {
        self.context_config = Some(config);
        self
    }

    /// Whether an element of `source_type` may be dropped into this material
    pub fn accepts(&self, source_type: &str) -> bool {
        self.is_container || self.drop_types.iter().any(|t| t == source_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_accepts_everything() {
        let m = Material::container("Section");
        assert!(m.accepts("Button"));
        assert!(m.accepts("Anything"));
    }

    #[test]
    fn test_drop_types_filter() {
        let m = Material::new("Toolbar").with_drop_types(["Button", "Link"]);
        assert!(m.accepts("Button"));
        assert!(!m.accepts("Table"));
    }

    #[test]
    fn test_plain_material_rejects_drops() {
        assert!(!Material::new("Button").accepts("Button"));
    }

    #[test]
    fn test_material_json_keys() {
        let m: Material = serde_json::from_str(
            r#"{ "name": "Toolbar", "isContainer": false, "dropTypes": ["Button"] }"#,
        )
        .unwrap();
        assert_eq!(m.drop_types, vec!["Button".to_string()]);
        assert!(!m.is_container);
    }
}
