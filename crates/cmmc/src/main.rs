//! C-- compiler - checks a script and reports what it finds
//!
//! Usage: cmmc [OPTIONS] <input>

use anyhow::Context;
use clap::Parser as ClapParser;
use cmm_compiler::common::{CompileError, DiagnosticReporter};
use cmm_compiler::driver::Pipeline;
use cmm_compiler::frontend::FrontendConfig;
use simple_logger::SimpleLogger;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "cmmc")]
#[command(author = "CMinusMinus Team")]
#[command(version = "0.1.0")]
#[command(about = "Semantic checker for C-- scripts", long_about = None)]
struct Args {
    /// Input script
    #[arg(required = true)]
    input: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log every declaration, assignment and native call
    #[arg(long)]
    trace: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump the final symbol table
    #[arg(long)]
    dump_symbols: bool,

    /// Dump the operations recorded by native calls
    #[arg(long)]
    dump_ops: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.trace {
        log::LevelFilter::Trace
    } else if args.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("warning: could not install logger: {}", e);
    }

    if let Err(e) = run(&args) {
        // Diagnostics have been rendered already
        if !matches!(e.downcast_ref::<CompileError>(), Some(CompileError::Rejected { .. })) {
            eprintln!("error: {:#}", e);
        }
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("could not read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    // Set up diagnostic reporter
    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    let pipeline = Pipeline::new().context("could not set up native functions")?;
    log::info!("{} native functions available", pipeline.natives().len());

    let config = FrontendConfig {
        dump_tokens: args.dump_tokens,
        dump_symbols: args.dump_symbols,
        verbose: args.verbose,
    };

    let report = pipeline.compile_source(&source, &filename, &config, &reporter, file_id)?;

    if args.dump_ops {
        println!("=== Operations ===");
        for op in &report.operations {
            println!("{}", op);
        }
        println!("=== End Operations ===");
    }

    if args.verbose {
        eprintln!("Successfully checked {}", args.input.display());
    }

    Ok(())
}
