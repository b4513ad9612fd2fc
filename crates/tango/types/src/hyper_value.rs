//! Hyper values: typed dynamic values resolved by flow logic
//!
//! On the wire a hyper value is `{ "type": ..., "value": ... }`. The `type`
//! tag decides how `value` is shaped and how it is evaluated. A missing
//! `value` falls back to the default for its type.

use crate::HyperValueError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `type` tag of a hyper value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HyperValueKind {
    String,
    Number,
    Boolean,
    Null,
    Expression,
    Code,
    Function,
    ContextValue,
}

impl std::fmt::Display for HyperValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Expression => "expression",
            Self::Code => "code",
            Self::Function => "function",
            Self::ContextValue => "contextValue",
        };
        f.write_str(name)
    }
}

/// Parameters and body of an author-defined function
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionValue {
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub body: String,
}

/// A typed dynamic value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHyperValue", into = "RawHyperValue")]
pub enum HyperValue {
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
    Null,
    /// A single expression evaluated against the execution scope
    Expression(String),
    /// A statement block; its `return` value is the result
    Code(String),
    /// Metadata from which the flow layer builds a callable
    Function(FunctionValue),
    /// Dotted path into the context store: `elementId.key.sub`
    ///
    /// An id containing dots is matched against the longest prefix that
    /// names a published record.
    ContextValue(String),
}

impl HyperValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn number(value: impl Into<serde_json::Number>) -> Self {
        Self::Number(value.into())
    }

    pub fn expression(source: impl Into<String>) -> Self {
        Self::Expression(source.into())
    }

    pub fn code(source: impl Into<String>) -> Self {
        Self::Code(source.into())
    }

    pub fn context_value(path: impl Into<String>) -> Self {
        Self::ContextValue(path.into())
    }

    pub fn kind(&self) -> HyperValueKind {
        match self {
            Self::String(_) => HyperValueKind::String,
            Self::Number(_) => HyperValueKind::Number,
            Self::Boolean(_) => HyperValueKind::Boolean,
            Self::Null => HyperValueKind::Null,
            Self::Expression(_) => HyperValueKind::Expression,
            Self::Code(_) => HyperValueKind::Code,
            Self::Function(_) => HyperValueKind::Function,
            Self::ContextValue(_) => HyperValueKind::ContextValue,
        }
    }

    /// Whether evaluation is the identity
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::String(_) | Self::Number(_) | Self::Boolean(_) | Self::Null
        )
    }

    /// The JSON value of a literal
    pub fn literal(&self) -> Option<Value> {
        match self {
            Self::String(s) => Some(Value::String(s.clone())),
            Self::Number(n) => Some(Value::Number(n.clone())),
            Self::Boolean(b) => Some(Value::Bool(*b)),
            Self::Null => Some(Value::Null),
            _ => None,
        }
    }
}

/// Wire form of a hyper value
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawHyperValue {
    #[serde(rename = "type")]
    pub kind: HyperValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl TryFrom<RawHyperValue> for HyperValue {
    type Error = HyperValueError;

    fn try_from(raw: RawHyperValue) -> Result<Self, Self::Error> {
        let kind = raw.kind;
        let mismatch = |expected| HyperValueError { kind, expected };
        let Some(value) = raw.value else {
            return Ok(match kind {
                HyperValueKind::String => Self::String(String::new()),
                HyperValueKind::Number => Self::Number(0.into()),
                HyperValueKind::Boolean => Self::Boolean(false),
                HyperValueKind::Null => Self::Null,
                HyperValueKind::Expression => Self::Expression(String::new()),
                HyperValueKind::Code => Self::Code(String::new()),
                HyperValueKind::Function => Self::Function(FunctionValue::default()),
                HyperValueKind::ContextValue => Self::ContextValue(String::new()),
            });
        };

        match (kind, value) {
            (HyperValueKind::String, Value::String(s)) => Ok(Self::String(s)),
            (HyperValueKind::String, _) => Err(mismatch("a string")),
            (HyperValueKind::Number, Value::Number(n)) => Ok(Self::Number(n)),
            (HyperValueKind::Number, _) => Err(mismatch("a number")),
            (HyperValueKind::Boolean, Value::Bool(b)) => Ok(Self::Boolean(b)),
            (HyperValueKind::Boolean, _) => Err(mismatch("a boolean")),
            (HyperValueKind::Null, _) => Ok(Self::Null),
            (HyperValueKind::Expression, Value::String(s)) => Ok(Self::Expression(s)),
            (HyperValueKind::Expression, _) => Err(mismatch("source text")),
            (HyperValueKind::Code, Value::String(s)) => Ok(Self::Code(s)),
            (HyperValueKind::Code, _) => Err(mismatch("source text")),
            (HyperValueKind::Function, v @ Value::Object(_)) => serde_json::from_value(v)
                .map(Self::Function)
                .map_err(|_| mismatch("{ params, body }")),
            (HyperValueKind::Function, _) => Err(mismatch("{ params, body }")),
            (HyperValueKind::ContextValue, Value::String(s)) => Ok(Self::ContextValue(s)),
            (HyperValueKind::ContextValue, _) => Err(mismatch("a dotted path")),
        }
    }
}

impl From<HyperValue> for RawHyperValue {
    fn from(value: HyperValue) -> Self {
        let kind = value.kind();
        let value = match value {
            HyperValue::String(s)
            | HyperValue::Expression(s)
            | HyperValue::Code(s)
            | HyperValue::ContextValue(s) => Some(Value::String(s)),
            HyperValue::Number(n) => Some(Value::Number(n)),
            HyperValue::Boolean(b) => Some(Value::Bool(b)),
            HyperValue::Null => None,
            HyperValue::Function(f) => serde_json::to_value(f).ok(),
        };
        Self { kind, value }
    }
}
