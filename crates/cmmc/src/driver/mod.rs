//! Compilation driver and pipeline orchestration

use crate::common::{CompileResult, DiagnosticReporter};
use crate::frontend::{CheckReport, CmmFrontend, CompileContext, FrontendConfig};
use crate::natives::NativeRegistry;

/// Compilation pipeline owning the process-wide native registry
///
/// The registry is filled once when the pipeline is built and only read
/// afterwards, so one pipeline can compile any number of scripts.
pub struct Pipeline {
    natives: NativeRegistry,
}

impl Pipeline {
    /// Pipeline with every built-in native registered
    pub fn new() -> CompileResult<Self> {
        Ok(Self::with_natives(NativeRegistry::with_builtins()?))
    }

    pub fn with_natives(natives: NativeRegistry) -> Self {
        Self { natives }
    }

    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    /// Check a script and return whatever was found, diagnostics included
    pub fn check_source(&self, source: &str) -> CheckReport {
        CmmFrontend::new(&self.natives).check(source)
    }

    /// Compile a script, rendering diagnostics through `reporter`
    pub fn compile_source(
        &self,
        source: &str,
        filename: &str,
        config: &FrontendConfig,
        reporter: &DiagnosticReporter,
        file_id: usize,
    ) -> CompileResult<CheckReport> {
        let ctx = CompileContext::new(filename.to_string(), file_id, reporter);
        CmmFrontend::new(&self.natives).compile(source, &ctx, config)
    }
}
