//! The Tarn middle-end driver.
//!
//! Provides the `tarnc` command with the following subcommands:
//!
//! - `tarnc inline <program.json>` - Inline every iterator call and print the
//!   resulting signatures
//! - `tarnc dump <program.json>` - Print a program's signatures unchanged
//!
//! Options:
//! - `--source` - Source text the program's spans point into, for diagnostics
//! - `--output` - Also write the transformed program as JSON
//! - `--json` - Output diagnostics as JSON (one object per line)
//! - `--no-color` - Disable colorized output
//! - `--log-level`, `--log-format` - Override `TARN_LOG_LEVEL` / `TARN_LOG_FORMAT`

mod logging;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tarn_ast::Ast;
use tarn_transform::diagnostics::{render_diagnostic, render_json, DiagnosticOptions};
use tarn_transform::{inline_iterators, InlineError, SignatureBinder};
use tracing::debug;

use logging::{init_logging, LogFormat, LogLevel, LogOptions, LogSettings};

/// Exit status for compiler bugs, as opposed to errors in the program.
const EXIT_INTERNAL: i32 = 101;

#[derive(Parser)]
#[command(name = "tarnc", version, about = "The Tarn middle-end driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log verbosity: error, warn, info, debug or trace
    #[arg(long = "log-level", global = true, value_parser = parse_log_level)]
    log_level: Option<LogLevel>,

    /// Log output format: text or json
    #[arg(long = "log-format", global = true, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inline iterators in a serialized program
    Inline {
        /// Path to the program (JSON)
        program: PathBuf,

        /// Source file the program was parsed from
        #[arg(long)]
        source: Option<PathBuf>,

        /// Write the transformed program to this path as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output diagnostics as JSON (one object per line) instead of human-readable format
        #[arg(long)]
        json: bool,

        /// Disable colorized output
        #[arg(long = "no-color")]
        no_color: bool,
    },
    /// Print the signatures of a serialized program
    Dump {
        /// Path to the program (JSON)
        program: PathBuf,
    },
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| format!("unknown log level '{value}'"))
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    LogFormat::parse(value).ok_or_else(|| format!("unknown log format '{value}'"))
}

/// Why a command failed.
enum Failure {
    /// Unreadable or malformed input files.
    Input(String),
    /// The pass rejected the program, or found a bug in an earlier pass.
    Inline(InlineError),
}

fn main() {
    let cli = Cli::parse();
    let settings = LogSettings {
        format: cli.log_format,
        level: cli.log_level,
    };
    init_logging(&settings.over(LogOptions::from_env()));

    match cli.command {
        Commands::Inline {
            program,
            source,
            output,
            json,
            no_color,
        } => {
            let diag_opts = DiagnosticOptions {
                color: !no_color && !json,
                json,
            };
            let source_text = match source.as_deref().map(std::fs::read_to_string).transpose() {
                Ok(text) => text,
                Err(e) => fail_input(&format!("failed to read source: {e}"), json),
            };
            let filename = source.as_deref().unwrap_or(&program).display().to_string();
            match inline(&program, output.as_deref()) {
                Ok(()) => {}
                Err(Failure::Input(message)) => fail_input(&message, json),
                Err(Failure::Inline(error)) => {
                    report(&error, source_text.as_deref(), &filename, &diag_opts);
                    let status = if error.is_internal() { EXIT_INTERNAL } else { 1 };
                    process::exit(status);
                }
            }
        }
        Commands::Dump { program } => match load_program(&program) {
            Ok(ast) => print!("{}", ast.dump_signatures()),
            Err(message) => fail_input(&message, false),
        },
    }
}

/// Load, transform and print a program.
fn inline(program: &Path, output: Option<&Path>) -> Result<(), Failure> {
    let mut ast = load_program(program).map_err(Failure::Input)?;
    let mut binder = SignatureBinder::new();
    let stats = inline_iterators(&mut ast, &mut binder).map_err(Failure::Inline)?;
    debug!(
        call_sites = stats.call_sites,
        confirmed = binder.confirmed(),
        "inlined {}",
        program.display()
    );

    if let Some(path) = output {
        let text = serde_json::to_string_pretty(&ast)
            .map_err(|e| Failure::Input(format!("failed to serialize program: {e}")))?;
        std::fs::write(path, text)
            .map_err(|e| Failure::Input(format!("failed to write '{}': {}", path.display(), e)))?;
    }
    print!("{}", ast.dump_signatures());
    Ok(())
}

fn load_program(path: &Path) -> Result<Ast, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?;
    let ast: Ast = serde_json::from_str(&text)
        .map_err(|e| format!("'{}' is not a valid program: {}", path.display(), e))?;
    ast.validate()
        .map_err(|e| format!("'{}' is not a valid program: {}", path.display(), e))?;
    Ok(ast)
}

fn report(error: &InlineError, source: Option<&str>, filename: &str, diag_opts: &DiagnosticOptions) {
    match source {
        Some(source) if diag_opts.json => eprintln!("{}", render_json(error, source, filename)),
        Some(source) => eprint!("{}", render_diagnostic(error, source, filename, diag_opts)),
        None if diag_opts.json => eprintln!("{}", render_json(error, "", filename)),
        // Without source text there is nothing to underline.
        None => match error.span() {
            Some(span) => eprintln!(
                "error[{}]: {}\n  --> {}@{}..{}",
                error.code(),
                error,
                filename,
                span.start,
                span.end
            ),
            None => eprintln!("error[{}]: {}", error.code(), error),
        },
    }
}

fn fail_input(message: &str, json: bool) -> ! {
    if json {
        let msg = serde_json::json!({
            "code": "T0001",
            "severity": "error",
            "message": message,
            "file": "",
            "spans": [],
        });
        eprintln!("{}", msg);
    } else {
        eprintln!("error: {}", message);
    }
    process::exit(1);
}
