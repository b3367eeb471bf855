//! C-- compiler - semantic checker for a tiny typed scripting language
//!
//! Scripts declare `int`, `float` and `string` variables inside nested
//! `{ }` blocks, assign to them, combine them with `+`/`-` and call a fixed
//! set of native functions. The compiler checks a script in one pass over
//! its tokens and reports every problem it finds.
//!
//! ## Architecture
//!
//! The compiler is organized into:
//! - **Frontend** (`frontend/`): Lexing with scope coordinates, semantic checking
//! - **Natives** (`natives/`): Registry of host functions scripts may call
//! - **Driver** (`driver/`): Pipeline owning the registry
//! - **Common** (`common/`): Shared infrastructure (errors, spans, diagnostics)
//! - **Types** (`types/`): Value types and values

pub mod common;
pub mod types;
pub mod frontend;
pub mod natives;
pub mod driver;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, Diagnostic, DiagnosticReporter, Span};
pub use driver::Pipeline;
pub use frontend::{CheckReport, CmmFrontend, CompileContext, FrontendConfig};
pub use natives::{NativeRegistry, Operation};
pub use types::{Value, ValueType};
