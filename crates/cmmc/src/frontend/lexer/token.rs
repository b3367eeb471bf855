//! Token definitions

use super::scope::ScopeCoord;
use crate::common::Span;
use crate::types::{Value, ValueType, parse_number};
use logos::Logos;

/// Token with source location and scope coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token; string literals keep their quotes
    pub text: String,
    /// 1-based line the token starts on
    pub line: usize,
    pub scope: ScopeCoord,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, scope: ScopeCoord, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            scope,
            span,
        }
    }

    /// Identifiers and string literals: anything that names or is a value
    pub fn is_value(&self) -> bool {
        self.kind.is_value()
    }

    pub fn is_type(&self) -> bool {
        self.kind.value_type().is_some()
    }

    /// The numeric constant this token spells, if it is one
    pub fn number(&self) -> Option<Value> {
        match self.kind {
            TokenKind::Identifier => parse_number(&self.text),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        self.number().is_some()
    }

    /// Contents of a string literal without the surrounding quotes
    pub fn string_contents(&self) -> Option<&str> {
        match self.kind {
            TokenKind::StringLiteral => Some(
                self.text
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .unwrap_or(&self.text),
            ),
            _ => None,
        }
    }
}

/// All token kinds
///
/// The `logos` patterns form the keyword/operator table used to classify a
/// finished word. The scanner itself is hand written because comments and
/// string literals span lines and carry state between them.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    #[token("{")]
    OpenScope,
    #[token("}")]
    CloseScope,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Equals,
    #[token("int")]
    TypeInt,
    #[token("float")]
    TypeFloat,
    #[token("string")]
    TypeString,
    #[token("+")]
    PlusOp,
    #[token("-")]
    MinusOp,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(",")]
    Comma,

    /// Variable names, function names and numeric constants
    #[regex(r"[^ \t\r\n]+", priority = 1)]
    Identifier,

    /// Produced by the scanner's string mode, never by classification
    StringLiteral,
}

impl TokenKind {
    /// Classify a complete word or punctuation character
    pub fn classify(text: &str) -> TokenKind {
        let mut lexer = TokenKind::lexer(text);
        match lexer.next() {
            Some(Ok(kind)) if lexer.span().len() == text.len() => kind,
            _ => TokenKind::Identifier,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, TokenKind::Identifier | TokenKind::StringLiteral)
    }

    pub fn is_scope(&self) -> bool {
        matches!(self, TokenKind::OpenScope | TokenKind::CloseScope)
    }

    /// Statement boundaries: `{`, `}` and `;`
    pub fn ends_statement(&self) -> bool {
        self.is_scope() || matches!(self, TokenKind::Semicolon)
    }

    /// The declared type of a type keyword
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            TokenKind::TypeInt => Some(ValueType::Int),
            TokenKind::TypeFloat => Some(ValueType::Float),
            TokenKind::TypeString => Some(ValueType::String),
            _ => None,
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, TokenKind::PlusOp | TokenKind::MinusOp)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenKind::OpenScope => "'{'",
            TokenKind::CloseScope => "'}'",
            TokenKind::Semicolon => "';'",
            TokenKind::Equals => "'='",
            TokenKind::TypeInt => "'int'",
            TokenKind::TypeFloat => "'float'",
            TokenKind::TypeString => "'string'",
            TokenKind::PlusOp => "'+'",
            TokenKind::MinusOp => "'-'",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Identifier => "identifier",
            TokenKind::StringLiteral => "string literal",
        };
        f.pad(text)
    }
}
