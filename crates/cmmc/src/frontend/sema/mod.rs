//! Semantic analysis module
//!
//! Checks the flat token stream in a single pass: symbol resolution, type
//! checking, scope access and native call validation. There is no syntax
//! tree; every rule looks at the current token and its neighbours.

mod symbols;
mod checker;
mod report;

pub use symbols::{Symbol, SymbolTable};
pub use checker::SemanticChecker;
pub use report::CheckReport;
