//! Parser: recursive descent parser for expressions and code blocks
//!
//! Expressions use precedence climbing, lowest first:
//! ternary, `||`, `&&`, equality, comparison, additive, multiplicative,
//! unary, postfix (member, index, call), primary.
//!
//! Every nested construct, and every link of an operator or postfix
//! chain, counts towards [`Parser::MAX_DEPTH`]. Deeper input fails with
//! [`ExprError::NestingTooDeep`], which keeps both parsing and evaluation
//! within a bounded stack.

use crate::errors::{ExprError, ExprResult};
use crate::lexer::{Lexer, Token, TokenKind};
use serde_json::Value;

/// Unary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Binary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

/// Expression syntax tree
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Undefined,
    Ident(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
}

/// Statement syntax tree for code blocks
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Let(String, Expr),
    Assign(String, Expr),
    Expr(Expr),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
}

/// A parsed code block
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// Parser over a token stream
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Deepest syntax tree a snippet may produce
    pub const MAX_DEPTH: usize = 128;

    /// Parse a single expression; trailing input is an error
    pub fn parse_expression(input: &str) -> ExprResult<Expr> {
        let mut parser = Self::from_source(input)?;
        let expr = parser.expression()?;
        parser.expect(TokenKind::Eof)?;
        Ok(expr)
    }

    /// Parse a code block: `;`-separated statements
    pub fn parse_program(input: &str) -> ExprResult<Program> {
        let mut parser = Self::from_source(input)?;
        let mut statements = Vec::new();
        while !parser.check(TokenKind::Eof) {
            statements.push(parser.statement()?);
        }
        Ok(Program { statements })
    }

    fn from_source(input: &str) -> ExprResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            depth: 0,
        })
    }

    // ── Statements ───────────────────────────────────────────────────

    fn statement(&mut self) -> ExprResult<Stmt> {
        let stmt = match self.peek_kind() {
            TokenKind::Let => {
                self.advance();
                let name = self.expect(TokenKind::Identifier)?.text.clone();
                self.expect(TokenKind::Assign)?;
                Stmt::Let(name, self.expression()?)
            }
            TokenKind::If => return self.nested(Self::if_statement),
            TokenKind::While => {
                self.advance();
                self.expect(TokenKind::OpenParen)?;
                let condition = self.expression()?;
                self.expect(TokenKind::CloseParen)?;
                let body = self.block()?;
                return Ok(Stmt::While { condition, body });
            }
            TokenKind::Return => {
                self.advance();
                if self.check(TokenKind::Semicolon)
                    || self.check(TokenKind::CloseBrace)
                    || self.check(TokenKind::Eof)
                {
                    Stmt::Return(None)
                } else {
                    Stmt::Return(Some(self.expression()?))
                }
            }
            TokenKind::Identifier if self.peek_kind_at(1) == TokenKind::Assign => {
                let name = self.advance().text.clone();
                self.advance();
                Stmt::Assign(name, self.expression()?)
            }
            _ => Stmt::Expr(self.expression()?),
        };

        // Semicolons are optional before `}` and end of input
        if !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
            self.expect(TokenKind::Semicolon)?;
        }
        while self.check(TokenKind::Semicolon) {
            self.advance();
        }
        Ok(stmt)
    }

    fn if_statement(&mut self) -> ExprResult<Stmt> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::OpenParen)?;
        let condition = self.expression()?;
        self.expect(TokenKind::CloseParen)?;
        let then_branch = self.block()?;

        let else_branch = if self.check(TokenKind::Else) {
            self.advance();
            if self.check(TokenKind::If) {
                vec![self.nested(Self::if_statement)?]
            } else {
                self.block()?
            }
        } else {
            Vec::new()
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn block(&mut self) -> ExprResult<Vec<Stmt>> {
        self.nested(Self::block_body)
    }

    fn block_body(&mut self) -> ExprResult<Vec<Stmt>> {
        self.expect(TokenKind::OpenBrace)?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
            statements.push(self.statement()?);
        }
        self.expect(TokenKind::CloseBrace)?;
        while self.check(TokenKind::Semicolon) {
            self.advance();
        }
        Ok(statements)
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn expression(&mut self) -> ExprResult<Expr> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> ExprResult<Expr> {
        let condition = self.binary(0)?;
        if !self.check(TokenKind::Question) {
            return Ok(condition);
        }
        self.advance();
        let then_expr = self.expression()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.expression()?;
        Ok(Expr::Conditional(
            Box::new(condition),
            Box::new(then_expr),
            Box::new(else_expr),
        ))
    }

    fn binary(&mut self, min_precedence: u8) -> ExprResult<Expr> {
        let base = self.depth;
        let mut left = self.unary()?;
        while let Some((op, precedence)) = binary_op(self.peek_kind()) {
            if precedence < min_precedence {
                break;
            }
            // Each fold deepens the left spine
            self.enter()?;
            self.advance();
            let right = self.binary(precedence + 1)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    fn unary(&mut self) -> ExprResult<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.postfix(),
        };
        self.advance();
        Ok(Expr::Unary(op, Box::new(self.nested(Self::unary)?)))
    }

    fn postfix(&mut self) -> ExprResult<Expr> {
        let base = self.depth;
        let mut expr = self.primary()?;
        loop {
            let kind = self.peek_kind();
            if matches!(
                kind,
                TokenKind::Dot | TokenKind::OpenBracket | TokenKind::OpenParen
            ) {
                self.enter()?;
            }
            match kind {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect(TokenKind::Identifier)?.text.clone();
                    expr = Expr::Member(Box::new(expr), name);
                }
                TokenKind::OpenBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(TokenKind::CloseBracket)?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                TokenKind::OpenParen => {
                    let Expr::Ident(name) = expr else {
                        let tok = self.peek();
                        return Err(ExprError::UnexpectedToken {
                            expected: "a function name before '('".into(),
                            found: tok.text.clone(),
                        });
                    };
                    self.advance();
                    let args = self.list(TokenKind::CloseParen, Self::expression)?;
                    expr = Expr::Call(name, args);
                }
                _ => {
                    self.depth = base;
                    return Ok(expr);
                }
            }
        }
    }

    fn primary(&mut self) -> ExprResult<Expr> {
        let tok = self.advance().clone();
        match tok.kind {
            TokenKind::NumberLiteral => {
                let number = if let Ok(i) = tok.text.parse::<i64>() {
                    Value::from(i)
                } else {
                    let f = tok.text.parse::<f64>().map_err(|_| ExprError::ParseError {
                        line: tok.line,
                        col: tok.col,
                        message: format!("Invalid number: {}", tok.text),
                    })?;
                    Value::from(f)
                };
                Ok(Expr::Literal(number))
            }
            TokenKind::StringLiteral => Ok(Expr::Literal(Value::String(tok.text))),
            TokenKind::True => Ok(Expr::Literal(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Value::Bool(false))),
            TokenKind::Null => Ok(Expr::Literal(Value::Null)),
            TokenKind::Undefined => Ok(Expr::Undefined),
            TokenKind::Identifier => Ok(Expr::Ident(tok.text)),
            TokenKind::OpenParen => {
                let expr = self.expression()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(expr)
            }
            TokenKind::OpenBracket => {
                let items = self.list(TokenKind::CloseBracket, Self::expression)?;
                Ok(Expr::Array(items))
            }
            TokenKind::OpenBrace => {
                let entries = self.list(TokenKind::CloseBrace, Self::object_entry)?;
                Ok(Expr::Object(entries))
            }
            TokenKind::Eof => Err(ExprError::UnexpectedEof("an expression".into())),
            _ => Err(ExprError::UnexpectedToken {
                expected: "an expression".into(),
                found: tok.text,
            }),
        }
    }

    fn object_entry(&mut self) -> ExprResult<(String, Expr)> {
        let tok = self.advance().clone();
        let key = match tok.kind {
            TokenKind::Identifier | TokenKind::StringLiteral => tok.text,
            _ => {
                return Err(ExprError::UnexpectedToken {
                    expected: "an object key".into(),
                    found: tok.text,
                })
            }
        };
        // `{ name }` shorthand
        if !self.check(TokenKind::Colon) {
            return Ok((key.clone(), Expr::Ident(key)));
        }
        self.advance();
        Ok((key, self.expression()?))
    }

    /// Comma-separated items up to `close`; the opener is already consumed
    fn list<T>(
        &mut self,
        close: TokenKind,
        mut item: impl FnMut(&mut Self) -> ExprResult<T>,
    ) -> ExprResult<Vec<T>> {
        let mut items = Vec::new();
        while !self.check(close) {
            items.push(item(self)?);
            if !self.check(TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(close)?;
        Ok(items)
    }

    // ── Depth tracking ───────────────────────────────────────────────

    fn enter(&mut self) -> ExprResult<()> {
        if self.depth >= Self::MAX_DEPTH {
            return Err(ExprError::NestingTooDeep(Self::MAX_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ExprResult<T>) -> ExprResult<T> {
        self.enter()?;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ── Token helpers ────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        self.tokens[idx].kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    fn expect(&mut self, kind: TokenKind) -> ExprResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            if tok.kind == TokenKind::Eof {
                Err(ExprError::UnexpectedEof(kind.to_string()))
            } else {
                Err(ExprError::UnexpectedToken {
                    expected: kind.to_string(),
                    found: tok.text.clone(),
                })
            }
        }
    }
}

/// Operator and precedence of a binary token
fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let entry = match kind {
        TokenKind::OrOr => (BinaryOp::Or, 1),
        TokenKind::AndAnd => (BinaryOp::And, 2),
        TokenKind::EqEq => (BinaryOp::Eq, 3),
        TokenKind::NotEq => (BinaryOp::NotEq, 3),
        TokenKind::Lt => (BinaryOp::Lt, 4),
        TokenKind::LtEq => (BinaryOp::LtEq, 4),
        TokenKind::Gt => (BinaryOp::Gt, 4),
        TokenKind::GtEq => (BinaryOp::GtEq, 4),
        TokenKind::Plus => (BinaryOp::Add, 5),
        TokenKind::Minus => (BinaryOp::Sub, 5),
        TokenKind::Star => (BinaryOp::Mul, 6),
        TokenKind::Slash => (BinaryOp::Div, 6),
        TokenKind::Percent => (BinaryOp::Rem, 6),
        _ => return None,
    };
    Some(entry)
}
