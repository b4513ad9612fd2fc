//! Restricted snippet interpreter for Tango hyper values
//!
//! Expression and code hyper values carry source text written in a small
//! JavaScript-like language. This crate lexes, parses and runs that text
//! against a read-only JSON scope. It has no I/O, no host access and a step
//! budget, so a misbehaving snippet fails with an error instead of hanging
//! the engine.
//!
//! # Key Concepts
//!
//! - **Expression**: a single expression such as `user.age >= 18 ? 'adult' : 'minor'`.
//! - **Code**: a block of statements (`let`, assignment, `if`/`else`, `while`,
//!   `return`). Its value is whatever `return` yields.
//! - **Scope**: a JSON object whose keys are visible as identifiers.
//!
//! # Example
//!
//! ```rust
//! use tango_expr::{Interpreter, Scope};
//! use serde_json::json;
//!
//! let scope: Scope = json!({ "count": 4 }).as_object().unwrap().clone();
//! let interp = Interpreter::new();
//!
//! let v = interp.eval_expression("count * 2", &scope).unwrap();
//! assert_eq!(v, Some(json!(8)));
//!
//! let v = interp.run_code("let n = 0; while (n < count) { n = n + 1; } return n;", &scope).unwrap();
//! assert_eq!(v, Some(json!(4)));
//! ```

#![deny(unsafe_code)]

mod errors;
mod interpreter;
mod lexer;
mod parser;

pub use errors::{ExprError, ExprResult};
pub use interpreter::{truthy, Interpreter, Scope};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{BinaryOp, Expr, Parser, Program, Stmt, UnaryOp};
