//! Script frontend
//!
//! The frontend is responsible for:
//! 1. Lexing source code into tokens with scope coordinates
//! 2. Checking the token stream and tracking variable values
//! 3. Reporting what the check found

pub mod lexer;
pub mod sema;

use crate::common::{CompileError, CompileResult, DiagnosticReporter};
use crate::natives::NativeRegistry;

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use sema::{CheckReport, SemanticChecker};

/// Configuration options passed to the frontend
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_symbols: bool,
    pub verbose: bool,
}

/// Compilation context providing access to diagnostics and file info
pub struct CompileContext<'a> {
    pub filename: String,
    pub file_id: usize,
    pub reporter: &'a DiagnosticReporter,
}

impl<'a> CompileContext<'a> {
    pub fn new(filename: String, file_id: usize, reporter: &'a DiagnosticReporter) -> Self {
        Self { filename, file_id, reporter }
    }
}

/// Frontend for one script, checked against a native registry
pub struct CmmFrontend<'n> {
    natives: &'n NativeRegistry,
}

impl<'n> CmmFrontend<'n> {
    pub fn new(natives: &'n NativeRegistry) -> Self {
        Self { natives }
    }

    /// Lex and check a script without reporting anything
    pub fn check(&self, source: &str) -> CheckReport {
        let tokens = tokenize(source);
        log::debug!("lexed {} tokens", tokens.len());
        SemanticChecker::new(&tokens, self.natives).check()
    }

    /// Compile one script
    ///
    /// Every diagnostic is rendered through the context's reporter. The
    /// report is returned only when the script is free of diagnostics.
    pub fn compile(
        &self,
        source: &str,
        ctx: &CompileContext,
        config: &FrontendConfig,
    ) -> CompileResult<CheckReport> {
        // Phase 1: Lexing
        if config.verbose {
            eprintln!("Lexing {}...", ctx.filename);
        }
        let tokens = tokenize(source);
        log::debug!("lexed {} tokens", tokens.len());

        if config.dump_tokens {
            eprintln!("=== Tokens ===");
            eprint!("{}", dump_tokens(&tokens));
            eprintln!("=== End Tokens ===\n");
        }

        // Phase 2: Checking
        if config.verbose {
            eprintln!("Checking...");
        }
        let report = SemanticChecker::new(&tokens, self.natives).check();

        if config.dump_symbols {
            eprintln!("=== Symbols ===");
            eprint!("{}", report.symbol_dump());
            eprintln!("=== End Symbols ===\n");
        }

        // Phase 3: Reporting
        for diagnostic in &report.diagnostics {
            ctx.reporter.report_diagnostic(ctx.file_id, diagnostic);
        }

        if report.has_errors() {
            let error = CompileError::rejected(report.diagnostics.len());
            ctx.reporter.report_error(ctx.file_id, &error);
            return Err(error);
        }

        if config.verbose {
            eprintln!(
                "Checked {}: {} variable(s), {} operation(s)",
                ctx.filename,
                report.symbols.len(),
                report.operations.len()
            );
        }

        Ok(report)
    }
}

/// One line per token: line, scope coordinate, kind and text
pub fn dump_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| {
            format!(
                "{:>4} [{}, {}] {:<14} {}\n",
                t.line,
                t.scope.depth,
                t.scope.region,
                t.kind,
                t.text
            )
        })
        .collect()
}
