//! Schema documents: the declarative input of an engine instance
//!
//! A schema names every element, arranges them in a layout tree and
//! carries free-form extensions. Validation checks that the layout is a
//! single tree rooted at `layout.root` covering every element exactly once.

use crate::{ContextConfig, Element, ElementId, Material, Props, SchemaResult, SchemaValidationError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// An element as stored in a schema document, keyed by its id
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementDef {
    /// Optional repeat of the map key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ElementId>,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
    #[serde(
        default,
        rename = "contextConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub context_config: Option<ContextConfig>,
}

impl ElementDef {
    /// Materialize the element stored under `key`
    pub fn to_element(&self, key: &ElementId) -> Element {
        Element {
            id: key.clone(),
            element_type: self.element_type.clone(),
            props: self.props.clone(),
            material: self.material.clone(),
            context_config: self.context_config.clone(),
        }
    }
}

impl From<Element> for ElementDef {
    fn from(element: Element) -> Self {
        Self {
            id: None,
            element_type: element.element_type,
            props: element.props,
            material: element.material,
            context_config: element.context_config,
        }
    }
}

/// Layout tree: a root plus parent → ordered children
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<ElementId>,
    #[serde(default)]
    pub structure: BTreeMap<ElementId, Vec<ElementId>>,
}

impl Layout {
    /// Children of `id`, empty when it has none
    pub fn children(&self, id: &ElementId) -> &[ElementId] {
        self.structure.get(id).map(Vec::as_slice).unwrap_or_default()
    }
}

/// A complete schema document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub elements: BTreeMap<ElementId, ElementDef>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

impl Schema {
    /// Create a schema holding just a root element
    pub fn with_root(root: Element) -> Self {
        let id = root.id.clone();
        let mut elements = BTreeMap::new();
        elements.insert(id.clone(), ElementDef::from(root));
        Self {
            elements,
            layout: Layout {
                root: Some(id),
                structure: BTreeMap::new(),
            },
            extensions: serde_json::Map::new(),
        }
    }

    /// Append `element` to the children of `parent`
    ///
    /// No validation happens here; call [`Schema::validate`] once the
    /// document is assembled.
    pub fn add_child(&mut self, parent: impl Into<ElementId>, element: Element) -> &mut Self {
        let id = element.id.clone();
        self.elements.insert(id.clone(), ElementDef::from(element));
        self.layout
            .structure
            .entry(parent.into())
            .or_default()
            .push(id);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Get an element by id
    pub fn element(&self, id: &ElementId) -> Option<Element> {
        self.elements.get(id).map(|def| def.to_element(id))
    }

    /// Validate the schema for structural correctness
    pub fn validate(&self) -> SchemaResult<()> {
        self.preorder().map(|_| ())
    }

    /// Validate and return every element id in depth-first pre-order
    pub fn preorder(&self) -> SchemaResult<Vec<ElementId>> {
        for (key, def) in &self.elements {
            if let Some(id) = &def.id {
                if id != key {
                    return Err(SchemaValidationError::IdMismatch {
                        key: key.clone(),
                        id: id.clone(),
                    });
                }
            }
        }

        let root = self
            .layout
            .root
            .as_ref()
            .ok_or(SchemaValidationError::MissingRoot)?;
        if !self.elements.contains_key(root) {
            return Err(SchemaValidationError::UnknownRoot(root.clone()));
        }

        // Every referenced id must exist and have at most one parent
        let mut parent_of: HashMap<&ElementId, &ElementId> = HashMap::new();
        for (parent, children) in &self.layout.structure {
            if !self.elements.contains_key(parent) {
                return Err(SchemaValidationError::UnknownElement(parent.clone()));
            }
            for child in children {
                if !self.elements.contains_key(child) {
                    return Err(SchemaValidationError::UnknownElement(child.clone()));
                }
                if let Some(first) = parent_of.insert(child, parent) {
                    return Err(SchemaValidationError::SharedChild {
                        child: child.clone(),
                        first: first.clone(),
                        second: parent.clone(),
                    });
                }
            }
        }

        // With at most one parent per id, revisiting a node means a cycle
        let mut order = Vec::with_capacity(self.elements.len());
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(SchemaValidationError::CycleDetected(id.clone()));
            }
            order.push(id.clone());
            stack.extend(self.layout.children(id).iter().rev());
        }

        if let Some(orphan) = self.elements.keys().find(|id| !visited.contains(id)) {
            return Err(SchemaValidationError::Unreachable(orphan.clone()));
        }

        Ok(order)
    }
}
