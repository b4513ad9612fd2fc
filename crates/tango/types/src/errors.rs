//! Error types for the schema and value model

use crate::{ElementId, HyperValueKind};

/// Reasons a schema document is rejected on load
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("Layout does not declare a root element")]
    MissingRoot,

    #[error("Root element not found in elements: {0}")]
    UnknownRoot(ElementId),

    #[error("Layout references unknown element: {0}")]
    UnknownElement(ElementId),

    #[error("Element '{child}' is a child of both '{first}' and '{second}'")]
    SharedChild {
        child: ElementId,
        first: ElementId,
        second: ElementId,
    },

    #[error("Cycle detected in layout structure at element: {0}")]
    CycleDetected(ElementId),

    #[error("Element is not reachable from the root: {0}")]
    Unreachable(ElementId),

    #[error("Element stored under '{key}' declares a different id '{id}'")]
    IdMismatch { key: ElementId, id: ElementId },
}

/// Result type alias for schema operations
pub type SchemaResult<T> = Result<T, SchemaValidationError>;

/// A `{type, value}` pair whose payload does not fit its declared type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Hyper value of type '{kind}' expects {expected}")]
pub struct HyperValueError {
    pub kind: HyperValueKind,
    pub expected: &'static str,
}

/// Errors found when validating a flow document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Duplicate flow node ID: {0}")]
    DuplicateNode(String),

    #[error("Edge {source_node} -> {target_node} references unknown node '{missing}'")]
    DanglingEdge {
        source_node: String,
        target_node: String,
        missing: String,
    },
}
