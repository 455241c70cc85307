//! # modelsmith
//!
//! Command-line front end for the model compiler.
//!
//! ## Commands
//!
//! - `migrate` - Upgrade a document to the current schema version
//! - `check` - Report naming conflicts and incomplete relations
//! - `context` - Print the per-model IR as JSON
//! - `split` - Replace a many-to-many relation with a joiner model
//! - `swap` - Move the foreign key of a one-to-one relation to the other side
//!

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use modelsmith_codegen::{CompileConfig, compile};
use modelsmith_core::{DatabaseType, EnglishInflector, Persistable};
use modelsmith_ir::{Document, migrate, split_many_to_many, swap_foreign_key};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "modelsmith")]
#[command(version, about = "Compile data-model documents into generator-ready IR")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upgrade a document to the current schema version
    Migrate(FileArgs),

    /// Report naming conflicts and incomplete relations
    Check {
        #[command(flatten)]
        file: FileArgs,

        /// Backend whose column kinds are projected
        #[arg(long, env = "MODELSMITH_BACKEND")]
        backend: Option<DatabaseType>,
    },

    /// Print the per-model IR as JSON
    Context {
        #[command(flatten)]
        file: FileArgs,

        /// Backend whose column kinds are projected
        #[arg(long, env = "MODELSMITH_BACKEND")]
        backend: Option<DatabaseType>,

        /// Do not synthesize createdAt / updatedAt
        #[arg(long)]
        no_audit: bool,

        /// Renderer option copied into the output, as KEY=VALUE (repeatable)
        #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
        options: Vec<(String, String)>,
    },

    /// Replace a many-to-many relation with a joiner model
    Split {
        #[command(flatten)]
        file: FileArgs,

        /// Id of the many-to-many relation
        relation: Uuid,
    },

    /// Move the foreign key of a one-to-one relation to the other side
    Swap {
        #[command(flatten)]
        file: FileArgs,

        /// Id of the one-to-one relation
        relation: Uuid,
    },
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Document to read
    file: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            std::process::exit(2);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run one command, returning the process exit code
fn run(command: Command) -> Result<i32> {
    match command {
        Command::Migrate(args) => {
            let document = load(&args.file)?;
            emit(&document.to_json()?, args.output.as_deref())?;
            Ok(0)
        }
        Command::Check { file, backend } => {
            let document = load(&file.file)?;
            let compilation = compile(
                &document,
                &EnglishInflector,
                &config(backend, false, Vec::new()),
            );

            if compilation.diagnostics.is_empty() {
                println!("{} {}", "ok:".green().bold(), document.project.name);
                return Ok(0);
            }

            let mut report = String::new();
            for diagnostic in &compilation.diagnostics {
                eprintln!("{} {}", "warning:".yellow().bold(), diagnostic);
                report.push_str(diagnostic);
                report.push('\n');
            }
            if let Some(path) = file.output.as_deref() {
                emit(&report, Some(path))?;
            }
            eprintln!(
                "{} {} diagnostic(s) in {}",
                "summary:".bold(),
                compilation.diagnostics.len(),
                document.project.name
            );
            Ok(1)
        }
        Command::Context {
            file,
            backend,
            no_audit,
            options,
        } => {
            let document = load(&file.file)?;
            let compilation = compile(
                &document,
                &EnglishInflector,
                &config(backend, no_audit, options),
            );
            for diagnostic in &compilation.diagnostics {
                eprintln!("{} {}", "warning:".yellow().bold(), diagnostic);
            }
            emit(&compilation.to_json()?, file.output.as_deref())?;
            Ok(0)
        }
        Command::Split { file, relation } => {
            let document = load(&file.file)?;
            let split = split_many_to_many(&document, relation)
                .with_context(|| format!("failed to split relation {}", relation))?;
            emit(&split.to_json()?, file.output.as_deref())?;
            Ok(0)
        }
        Command::Swap { file, relation } => {
            let document = load(&file.file)?;
            let swapped = swap_foreign_key(&document, relation)
                .with_context(|| format!("failed to swap relation {}", relation))?;
            emit(&swapped.to_json()?, file.output.as_deref())?;
            Ok(0)
        }
    }
}

fn config(
    backend: Option<DatabaseType>,
    no_audit: bool,
    options: Vec<(String, String)>,
) -> CompileConfig {
    let mut config = CompileConfig::new();
    for (key, value) in options {
        config = config.with_option(key, value);
    }
    if let Some(backend) = backend {
        config = config.with_backend(backend);
    }
    if no_audit {
        config = config.without_audit_attributes();
    }
    config
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, found '{}'", raw)),
    }
}

/// Read and migrate a document from disk
fn load(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    if !raw.is_object() {
        bail!("{} does not contain a document object", path.display());
    }

    debug!(path = %path.display(), "loaded document");
    migrate(raw).with_context(|| format!("failed to load {}", path.display()))
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}
