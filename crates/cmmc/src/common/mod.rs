//! Common infrastructure shared by the lexer, checker and driver

mod error;
mod span;

pub use error::{CompileError, CompileResult, Diagnostic, DiagnosticReporter};
pub use span::Span;
