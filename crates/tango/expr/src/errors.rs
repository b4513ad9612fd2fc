//! Expression language error types

/// Errors that can occur while parsing or running a snippet
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("Parse error at line {line}, column {col}: {message}")]
    ParseError {
        line: usize,
        col: usize,
        message: String,
    },

    #[error("Unexpected token: expected {expected}, found '{found}'")]
    UnexpectedToken { expected: String, found: String },

    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    #[error("'{0}' is not defined")]
    UnknownIdentifier(String),

    #[error("Unknown function: '{0}'")]
    UnknownFunction(String),

    #[error("Function '{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Evaluation exceeded the budget of {0} steps")]
    StepBudgetExceeded(usize),

    #[error("Snippet nests deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// Result type alias for expression operations
pub type ExprResult<T> = Result<T, ExprError>;
