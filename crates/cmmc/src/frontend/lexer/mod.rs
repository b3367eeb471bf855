//! Lexer module for tokenizing scripts

mod scope;
mod token;
mod scanner;

pub use scope::{ScopeCoord, ScopeTracker};
pub use token::{Token, TokenKind};
pub use scanner::{Lexer, tokenize};
