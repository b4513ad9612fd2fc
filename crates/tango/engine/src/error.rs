//! Engine error types

use tango_types::{ElementId, HyperValueKind, SchemaValidationError};

/// Error raised by a [`LogicExecutor`](crate::LogicExecutor)
pub type ExecutorError = Box<dyn std::error::Error + Send + Sync>;

/// Reasons a structural mutation is rejected
///
/// The graph is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDropTargetError {
    #[error("The root element '{0}' cannot be moved")]
    RootImmovable(ElementId),

    #[error("Moving '{element}' under '{target}' would create a cycle")]
    Cycle { element: ElementId, target: ElementId },

    #[error("Element '{target}' does not accept elements of type '{element_type}'")]
    Rejected {
        target: ElementId,
        element_type: String,
    },
}

/// A logic executor failed while evaluating a hyper value
#[derive(Debug, thiserror::Error)]
#[error("Failed to evaluate {kind} value: {source}")]
pub struct EvaluationError {
    pub kind: HyperValueKind,
    #[source]
    pub source: ExecutorError,
}

/// Errors returned by engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),

    #[error(transparent)]
    InvalidDropTarget(#[from] InvalidDropTargetError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Element already exists: {0}")]
    DuplicateElement(ElementId),

    #[error("The root element '{0}' cannot be removed")]
    RootRemoval(ElementId),

    #[error("No component registered for element type '{0}'")]
    UnknownComponent(String),

    #[error("A drag is already in progress")]
    DragInProgress,

    #[error("No drag is in progress")]
    NoActiveDrag,

    #[error("Plugin '{plugin}' failed in {hook}: {message}")]
    Plugin {
        plugin: String,
        hook: &'static str,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
