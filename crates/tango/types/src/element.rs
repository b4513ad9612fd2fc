//! Elements: the typed nodes of a composed UI tree

use crate::Material;
use serde::{Deserialize, Serialize};

/// Element props: string keys mapped to arbitrary JSON values
pub type Props = serde_json::Map<String, serde_json::Value>;

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier of an element within one schema instance
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id for an element created from the palette.
    ///
    /// The element type is used as a readable prefix.
    pub fn generate(element_type: &str) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", element_type, &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ── Element ──────────────────────────────────────────────────────────

/// One node of the composed UI tree
///
/// Identity is fixed for the element's lifetime. Props are replaced as a
/// whole; runtime-only data travels through the engine's state store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier
    pub id: ElementId,
    /// Component kind, the key into the component and material registries
    #[serde(rename = "type")]
    pub element_type: String,
    /// Declarative props
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub props: Props,
    /// Per-element material override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
    /// Values this element publishes to others
    #[serde(
        default,
        rename = "contextConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub context_config: Option<ContextConfig>,
}

impl Element {
    /// Create an element with empty props
    pub fn new(id: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(id),
            element_type: element_type.into(),
            props: Props::new(),
            material: None,
            context_config: None,
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_context_config(mut self, config: ContextConfig) -> Self {
        self.context_config = Some(config);
        self
    }

    /// Get a prop value by key
    pub fn prop(&self, key: &str) -> Option<&serde_json::Value> {
        self.props.get(key)
    }
}

// ── Context config ───────────────────────────────────────────────────

/// Descriptive metadata about the values an element publishes
///
/// Not enforced at runtime; editors use it to offer pickers for
/// `contextValue` hyper values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<ContextVariable>,
    #[serde(
        default,
        rename = "contextValues",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub context_values: Vec<ContextVariable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<ContextMethod>,
}

/// A published variable
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextVariable {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A published method
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMethod {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ContextVariable>,
}
