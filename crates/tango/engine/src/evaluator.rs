//! Hyper value evaluator
//!
//! Literals evaluate to themselves. `expression` and `code` text runs
//! through a pluggable [`LogicExecutor`]; context references resolve
//! against the context store; functions come back unevaluated so the flow
//! layer can build a callable from them.

use crate::context_store::ContextStore;
use crate::error::{EvaluationError, ExecutorError};
use serde_json::Value;
use tango_expr::Interpreter;
use tango_types::{FunctionValue, HyperValue};

/// Variables visible to expression and code snippets
pub type Scope = serde_json::Map<String, Value>;

/// Source text handed to a logic executor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Snippet<'a> {
    Expression(&'a str),
    Code(&'a str),
}

/// Runs expression and code snippets
///
/// Returning `Ok(None)` means the snippet produced no value (`undefined`).
pub trait LogicExecutor {
    fn execute(&self, snippet: Snippet<'_>, scope: &Scope) -> Result<Option<Value>, ExecutorError>;
}

impl LogicExecutor for Interpreter {
    fn execute(&self, snippet: Snippet<'_>, scope: &Scope) -> Result<Option<Value>, ExecutorError> {
        let result = match snippet {
            Snippet::Expression(source) => self.eval_expression(source, scope),
            Snippet::Code(source) => self.run_code(source, scope),
        };
        result.map_err(|e| Box::new(e) as ExecutorError)
    }
}

/// Result of evaluating a hyper value
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluated {
    Value(Value),
    Undefined,
    /// Unevaluated function metadata
    Function(FunctionValue),
}

impl Evaluated {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// JSON rendering; `undefined` has none
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Undefined => None,
            Self::Function(f) => Some(serde_json::json!({
                "params": f.params,
                "body": f.body,
            })),
        }
    }
}

impl From<Option<Value>> for Evaluated {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::Undefined, Self::Value)
    }
}

/// Evaluates hyper values with a pluggable executor
pub struct Evaluator {
    executor: Box<dyn LogicExecutor>,
}

impl Evaluator {
    pub fn new(executor: Box<dyn LogicExecutor>) -> Self {
        Self { executor }
    }

    /// Evaluator backed by the built-in interpreter
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self::new(Box::new(Interpreter::with_max_steps(max_steps)))
    }

    pub fn set_executor(&mut self, executor: Box<dyn LogicExecutor>) {
        self.executor = executor;
    }

    /// Evaluate `value` against `scope`, reading context references
    /// from `contexts`
    pub fn evaluate(
        &self,
        scope: &Scope,
        value: &HyperValue,
        contexts: &ContextStore,
    ) -> Result<Evaluated, EvaluationError> {
        let snippet = match value {
            HyperValue::Expression(source) => Snippet::Expression(source),
            HyperValue::Code(source) => Snippet::Code(source),
            HyperValue::Function(function) => return Ok(Evaluated::Function(function.clone())),
            HyperValue::ContextValue(path) => return Ok(contexts.resolve_path(path).into()),
            literal => return Ok(literal.literal().into()),
        };

        self.executor
            .execute(snippet, scope)
            .map(Evaluated::from)
            .map_err(|source| {
                tracing::debug!(kind = %value.kind(), error = %source, "Hyper value evaluation failed");
                EvaluationError {
                    kind: value.kind(),
                    source,
                }
            })
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Box::new(Interpreter::new()))
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tango_expr::ExprError;
    use tango_types::HyperValueKind;

    fn scope() -> Scope {
        json!({ "count": 3 }).as_object().unwrap().clone()
    }

    fn eval(value: HyperValue) -> Result<Evaluated, EvaluationError> {
        Evaluator::default().evaluate(&scope(), &value, &ContextStore::new())
    }

    #[test]
    fn test_literals_evaluate_to_themselves() {
        assert_eq!(eval(HyperValue::string("hi")).unwrap(), Evaluated::Value(json!("hi")));
        assert_eq!(eval(HyperValue::Null).unwrap(), Evaluated::Value(Value::Null));
        assert_eq!(eval(HyperValue::Boolean(true)).unwrap(), Evaluated::Value(json!(true)));
        assert_eq!(eval(HyperValue::number(7)).unwrap(), Evaluated::Value(json!(7)));
    }

    #[test]
    fn test_expression_and_code() {
        assert_eq!(
            eval(HyperValue::expression("count + 1")).unwrap(),
            Evaluated::Value(json!(4))
        );
        assert_eq!(
            eval(HyperValue::code("let x = count * 2; return x;")).unwrap(),
            Evaluated::Value(json!(6))
        );
        assert!(eval(HyperValue::expression("")).unwrap().is_undefined());
        assert!(eval(HyperValue::code("")).unwrap().is_undefined());
    }

    #[test]
    fn test_failure_wraps_source() {
        let err = eval(HyperValue::expression("nope + 1")).unwrap_err();
        assert_eq!(err.kind, HyperValueKind::Expression);
        assert_eq!(
            err.source.downcast_ref::<ExprError>(),
            Some(&ExprError::UnknownIdentifier("nope".into()))
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_function_is_not_evaluated() {
        let f = FunctionValue {
            params: vec!["a".into()],
            body: "return a;".into(),
        };
        let out = eval(HyperValue::Function(f.clone())).unwrap();
        assert_eq!(out, Evaluated::Function(f));
        assert_eq!(
            out.into_json(),
            Some(json!({ "params": ["a"], "body": "return a;" }))
        );
    }

    #[test]
    fn test_context_value() {
        let mut contexts = ContextStore::new();
        contexts.merge(
            &"form".into(),
            json!({ "variables": { "name": "Ada" } }).as_object().unwrap().clone(),
        );
        let evaluator = Evaluator::default();
        let hit = evaluator
            .evaluate(&scope(), &HyperValue::context_value("form.variables.name"), &contexts)
            .unwrap();
        assert_eq!(hit, Evaluated::Value(json!("Ada")));

        let miss = evaluator
            .evaluate(&scope(), &HyperValue::context_value("form.missing"), &contexts)
            .unwrap();
        assert!(miss.is_undefined());
    }

    struct Echo;

    impl LogicExecutor for Echo {
        fn execute(&self, snippet: Snippet<'_>, _scope: &Scope) -> Result<Option<Value>, ExecutorError> {
            match snippet {
                Snippet::Expression(s) => Ok(Some(json!(s))),
                Snippet::Code(_) => Err("code is disabled".into()),
            }
        }
    }

    #[test]
    fn test_custom_executor() {
        let evaluator = Evaluator::new(Box::new(Echo));
        let contexts = ContextStore::new();
        let out = evaluator
            .evaluate(&scope(), &HyperValue::expression("raw"), &contexts)
            .unwrap();
        assert_eq!(out, Evaluated::Value(json!("raw")));

        let err = evaluator
            .evaluate(&scope(), &HyperValue::code("x"), &contexts)
            .unwrap_err();
        assert_eq!(err.kind, HyperValueKind::Code);
        assert_eq!(err.source.to_string(), "code is disabled");
    }
}
