//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{self as cs, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;
use super::Span;

/// Fatal compile error
///
/// Semantic problems in the script are not errors in this sense; they are
/// collected as [`Diagnostic`]s and never abort the checker.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("native function '{name}' is already registered")]
    DuplicateNative { name: String },

    #[error("{count} error(s) found")]
    Rejected { count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn duplicate_native(name: impl Into<String>) -> Self {
        Self::DuplicateNative { name: name.into() }
    }

    pub fn rejected(count: usize) -> Self {
        Self::Rejected { count }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// A non-fatal semantic error found while checking a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based source line
    pub line: usize,
    /// Byte range of the token the problem was found at
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, span: Span, message: impl Into<String>) -> Self {
        Self {
            line,
            span,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    /// Render one semantic diagnostic with a label over the offending token
    pub fn report_diagnostic(&self, file_id: usize, diagnostic: &Diagnostic) {
        let report = cs::Diagnostic::error()
            .with_message(&diagnostic.message)
            .with_labels(vec![Label::primary(file_id, diagnostic.span)]);

        self.emit(&report);
    }

    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let report = match error {
            CompileError::Rejected { count } => cs::Diagnostic::error()
                .with_message(format!("could not compile `{}`", self.file_name(file_id)))
                .with_notes(vec![format!("{} error(s) found", count)]),

            other => cs::Diagnostic::error().with_message(other.to_string()),
        };

        self.emit(&report);
    }

    fn file_name(&self, file_id: usize) -> String {
        self.files
            .get(file_id)
            .map(|file| file.name().clone())
            .unwrap_or_default()
    }

    fn emit(&self, report: &cs::Diagnostic<usize>) {
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, report);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
