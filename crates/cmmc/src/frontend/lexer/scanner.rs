//! Hand-written scanner
//!
//! Scans character by character with four exclusive modes: between tokens,
//! inside a word, inside a string literal, inside a block comment. String
//! literals and block comments carry across line breaks.

use std::iter::Peekable;
use std::str::CharIndices;

use super::scope::ScopeTracker;
use super::token::{Token, TokenKind};
use crate::common::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Word { start: usize, line: usize },
    String { start: usize, line: usize, escaped: bool },
    BlockComment { line: usize },
}

/// Lexer for script source text
pub struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
    mode: Mode,
    buffer: String,
    line: usize,
    scope: ScopeTracker,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            mode: Mode::Normal,
            buffer: String::new(),
            line: 1,
            scope: ScopeTracker::new(),
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source
    ///
    /// Never fails. An unterminated string literal or block comment swallows
    /// the rest of the input, and a word still being read when the input
    /// ends is dropped.
    pub fn tokenize(mut self) -> Vec<Token> {
        while let Some((pos, c)) = self.chars.next() {
            match self.mode {
                Mode::String { .. } => self.scan_string(pos, c),
                Mode::BlockComment { .. } => self.scan_comment(c),
                Mode::Normal | Mode::Word { .. } => self.scan_normal(pos, c),
            }

            if c == '\n' {
                self.line += 1;
            }
        }

        match self.mode {
            Mode::Normal => {}
            Mode::Word { line, .. } => {
                log::debug!("line {}: dropping '{}' at end of input", line, self.buffer);
            }
            Mode::String { line, .. } => {
                log::debug!("line {}: string literal is never closed", line);
            }
            Mode::BlockComment { line } => {
                log::debug!("line {}: block comment is never closed", line);
            }
        }

        self.tokens
    }

    fn scan_normal(&mut self, pos: usize, c: char) {
        match c {
            ' ' | '\t' | '\r' | '\n' => self.flush(),

            '"' => {
                self.flush();
                self.buffer.push(c);
                self.mode = Mode::String {
                    start: pos,
                    line: self.line,
                    escaped: false,
                };
            }

            '/' if self.peek_char() == Some('/') => {
                self.flush();
                while self.peek_char().is_some_and(|n| n != '\n') {
                    self.chars.next();
                }
            }

            '/' if self.peek_char() == Some('*') => {
                self.flush();
                // Consume the '*' so that "/*/" does not close the comment
                self.chars.next();
                self.mode = Mode::BlockComment { line: self.line };
            }

            '{' | '}' | '=' | ';' | '+' | '-' | '(' | ')' | ',' => {
                self.flush();
                self.scope.advance(c);
                self.buffer.push(c);
                let kind = TokenKind::classify(&self.buffer);
                self.emit(kind, Span::new(pos, pos + c.len_utf8()), self.line);
            }

            _ => {
                if self.mode == Mode::Normal {
                    self.mode = Mode::Word {
                        start: pos,
                        line: self.line,
                    };
                }
                self.buffer.push(c);
            }
        }
    }

    fn scan_string(&mut self, pos: usize, c: char) {
        let Mode::String { start, line, escaped } = self.mode else {
            return;
        };

        self.buffer.push(c);
        if escaped {
            self.mode = Mode::String { start, line, escaped: false };
        } else if c == '\\' {
            self.mode = Mode::String { start, line, escaped: true };
        } else if c == '"' {
            self.mode = Mode::Normal;
            self.emit(TokenKind::StringLiteral, Span::new(start, pos + 1), line);
        }
    }

    fn scan_comment(&mut self, c: char) {
        if c == '*' && self.peek_char() == Some('/') {
            self.chars.next();
            self.mode = Mode::Normal;
        }
    }

    /// Emit the word being read, if any
    fn flush(&mut self) {
        if let Mode::Word { start, line } = self.mode {
            let kind = TokenKind::classify(&self.buffer);
            let span = Span::new(start, start + self.buffer.len());
            self.emit(kind, span, line);
        }
        self.mode = Mode::Normal;
    }

    fn emit(&mut self, kind: TokenKind, span: Span, line: usize) {
        let text = std::mem::take(&mut self.buffer);
        self.tokens
            .push(Token::new(kind, text, line, self.scope.current(), span));
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }
}

/// Tokenize a whole script
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
