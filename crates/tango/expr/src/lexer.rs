//! Lexer: tokenizes expression and code snippets
//!
//! The token set is a small JavaScript-like subset: literals, identifiers,
//! arithmetic, comparison and logical operators, member access, and the
//! handful of keywords code snippets need.

use crate::errors::{ExprError, ExprResult};

/// A token produced by the lexer
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The raw text of the token (unescaped for string literals)
    pub text: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            col,
        }
    }
}

/// Token types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Let,
    If,
    Else,
    While,
    Return,
    True,
    False,
    Null,
    Undefined,

    // Identifiers and literals
    Identifier,
    StringLiteral,
    NumberLiteral,

    // Structural
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Question,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Assign,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,

    // End of input
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Let => "let",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Return => "return",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Identifier => "identifier",
            Self::StringLiteral => "string literal",
            Self::NumberLiteral => "number",
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::OpenBracket => "[",
            Self::CloseBracket => "]",
            Self::OpenBrace => "{",
            Self::CloseBrace => "}",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::Question => "?",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Bang => "!",
            Self::Assign => "=",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// Lexer for snippet source text
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    /// Create a new lexer from input text
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> ExprResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.input.len() {
                tokens.push(Token::new(TokenKind::Eof, "", self.line, self.col));
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> ExprResult<Token> {
        let ch = self.input[self.pos];
        let line = self.line;
        let col = self.col;

        let single = |kind: TokenKind| Token::new(kind, ch.to_string(), line, col);

        let kind = match ch {
            '"' | '\'' => return self.read_string_literal(ch),
            c if c.is_ascii_digit() => return self.read_number(),
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                return Ok(self.read_identifier_or_keyword())
            }
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '?' => TokenKind::Question,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' | '!' | '<' | '>' | '&' | '|' => return self.read_operator(),
            _ => {
                return Err(ExprError::ParseError {
                    line,
                    col,
                    message: format!("Unexpected character: '{}'", ch),
                })
            }
        };

        self.advance();
        Ok(single(kind))
    }

    fn read_operator(&mut self) -> ExprResult<Token> {
        let line = self.line;
        let col = self.col;
        let ch = self.input[self.pos];
        let next = self.peek_at(1);

        // `===` and `!==` behave like `==` and `!=`
        let (kind, len) = match (ch, next) {
            ('=', Some('=')) if self.peek_at(2) == Some('=') => (TokenKind::EqEq, 3),
            ('!', Some('=')) if self.peek_at(2) == Some('=') => (TokenKind::NotEq, 3),
            ('=', Some('=')) => (TokenKind::EqEq, 2),
            ('!', Some('=')) => (TokenKind::NotEq, 2),
            ('<', Some('=')) => (TokenKind::LtEq, 2),
            ('>', Some('=')) => (TokenKind::GtEq, 2),
            ('&', Some('&')) => (TokenKind::AndAnd, 2),
            ('|', Some('|')) => (TokenKind::OrOr, 2),
            ('=', _) => (TokenKind::Assign, 1),
            ('!', _) => (TokenKind::Bang, 1),
            ('<', _) => (TokenKind::Lt, 1),
            ('>', _) => (TokenKind::Gt, 1),
            _ => {
                return Err(ExprError::ParseError {
                    line,
                    col,
                    message: format!("Unexpected character: '{}'", ch),
                })
            }
        };

        let text: String = self.input[self.pos..self.pos + len].iter().collect();
        for _ in 0..len {
            self.advance();
        }
        Ok(Token::new(kind, text, line, col))
    }

    fn read_string_literal(&mut self, quote: char) -> ExprResult<Token> {
        let line = self.line;
        let col = self.col;
        self.advance(); // skip opening quote

        let mut text = String::new();
        while self.pos < self.input.len() && self.input[self.pos] != quote {
            if self.input[self.pos] == '\\' {
                let escaped = match self.peek_at(1) {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some(c) => c,
                    None => break,
                };
                self.advance();
                text.push(escaped);
            } else {
                text.push(self.input[self.pos]);
            }
            self.advance();
        }

        if self.pos >= self.input.len() {
            return Err(ExprError::ParseError {
                line,
                col,
                message: "Unterminated string literal".into(),
            });
        }

        self.advance(); // skip closing quote
        Ok(Token::new(TokenKind::StringLiteral, text, line, col))
    }

    fn read_number(&mut self) -> ExprResult<Token> {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();

        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            text.push(self.input[self.pos]);
            self.advance();
        }

        if self.pos < self.input.len()
            && self.input[self.pos] == '.'
            && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            text.push('.');
            self.advance();
            while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
                text.push(self.input[self.pos]);
                self.advance();
            }
        }

        Ok(Token::new(TokenKind::NumberLiteral, text, line, col))
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut text = String::new();

        while self.pos < self.input.len() {
            let c = self.input[self.pos];
            if c.is_alphanumeric() || c == '_' || c == '$' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match text.as_str() {
            "let" | "const" | "var" => TokenKind::Let,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            _ => TokenKind::Identifier,
        };

        Token::new(kind, text, line, col)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.pos < self.input.len() {
            let c = self.input[self.pos];
            if c.is_whitespace() {
                self.advance();
            } else if c == '/' && self.peek_at(1) == Some('/') {
                while self.pos < self.input.len() && self.input[self.pos] != '\n' {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            if self.input[self.pos] == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a >= 1 && b !== 'x' || !c"),
            vec![
                TokenKind::Identifier,
                TokenKind::GtEq,
                TokenKind::NumberLiteral,
                TokenKind::AndAnd,
                TokenKind::Identifier,
                TokenKind::NotEq,
                TokenKind::StringLiteral,
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("let x = null; return undefined"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Null,
                TokenKind::Semicolon,
                TokenKind::Return,
                TokenKind::Undefined,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Lexer::new(r#""say \"hi\"\n""#).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, "say \"hi\"\n");
    }

    #[test]
    fn test_decimal_number_and_member_dot() {
        let tokens = Lexer::new("1.5 + a.b").tokenize().unwrap();
        assert_eq!(tokens[0].text, "1.5");
        assert_eq!(tokens[3].kind, TokenKind::Dot);
    }

    #[test]
    fn test_line_comments_and_positions() {
        let tokens = Lexer::new("// note\n  x").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!((tokens[0].line, tokens[0].col), (2, 3));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("'open").tokenize().unwrap_err();
        assert!(matches!(err, ExprError::ParseError { .. }));
    }

    #[test]
    fn test_unexpected_character() {
        assert!(Lexer::new("a # b").tokenize().is_err());
        assert!(Lexer::new("a & b").tokenize().is_err());
    }
}
