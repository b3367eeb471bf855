//! Result of checking one script

use super::symbols::Symbol;
use crate::common::Diagnostic;
use crate::natives::Operation;

/// Everything one checker run produced
#[derive(Debug, Default)]
pub struct CheckReport {
    /// In discovery order
    pub diagnostics: Vec<Diagnostic>,
    /// Final state of every declared variable, in declaration order
    pub symbols: Vec<Symbol>,
    /// Side effects recorded by native calls, in call order
    pub operations: Vec<Operation>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// One line per diagnostic, `Line N: message`
    pub fn diagnostic_dump(&self) -> String {
        self.diagnostics
            .iter()
            .map(|d| format!("{}\n", d))
            .collect()
    }

    /// One line per symbol with its final value and scope coordinate
    pub fn symbol_dump(&self) -> String {
        self.symbols.iter().map(|s| format!("{}\n", s)).collect()
    }
}
