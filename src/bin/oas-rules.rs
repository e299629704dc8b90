//! OpenAPI Rules CLI
//!
//! Command-line interface for compiling OpenAPI operations into validation
//! rules and data shapes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use oas_rules::{
    compile_document, find_operation, load_document_auto, CompileOptions, CompiledOperation,
    DEFAULT_ROUTE_BINDING_KEY, DEFAULT_RULE_OVERRIDE_KEY,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oas-rules")]
#[command(about = "Compile OpenAPI operations into validation rules and data shapes")]
#[command(version)]
struct Cli {
    /// Enable verbose logging on stderr. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile operations and print them as JSON
    Compile {
        #[command(flatten)]
        source: SourceArgs,

        /// Only compile this operation (operationId or "METHOD /path")
        #[arg(long)]
        operation: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the rules and data shape of one operation as text
    Rules {
        #[command(flatten)]
        source: SourceArgs,

        /// Operation to show (operationId or "METHOD /path")
        #[arg(long)]
        operation: String,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Dereferenced OpenAPI document: file path or URL (JSON or YAML)
    document: String,

    /// Schema extension holding explicit rule overrides
    #[arg(long, default_value = DEFAULT_RULE_OVERRIDE_KEY)]
    override_key: String,

    /// Parameter extension marking route-model-bound parameters
    #[arg(long, default_value = DEFAULT_ROUTE_BINDING_KEY)]
    binding_key: String,
}

impl SourceArgs {
    fn options(&self) -> CompileOptions {
        CompileOptions::new()
            .with_rule_override_key(&self.override_key)
            .with_route_binding_key(&self.binding_key)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Compile {
            source,
            operation,
            output,
            pretty,
        } => run_compile(&source, operation.as_deref(), output, pretty),
        Commands::Rules { source, operation } => run_rules(&source, &operation),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_compile(
    source: &SourceArgs,
    operation: Option<&str>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let document = load_document_auto(&source.document).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let options = source.options();

    let compiled: Vec<CompiledOperation> = match operation {
        Some(selector) => {
            let found = find_operation(&document, selector, &options).map_err(|e| {
                eprintln!("Error: {}", e);
                e.exit_code() as u8
            })?;
            vec![found]
        }
        None => compile_document(&document, &options),
    };
    tracing::info!(operations = compiled.len(), "compiled document");

    let json_output = if pretty {
        serde_json::to_string_pretty(&compiled)
    } else {
        serde_json::to_string(&compiled)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_rules(source: &SourceArgs, selector: &str) -> Result<(), u8> {
    let document = load_document_auto(&source.document).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let compiled = find_operation(&document, selector, &source.options()).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    println!("{} {}", compiled.method, compiled.path);
    for rule in &compiled.artifacts.rules {
        println!("  {} => {}", rule.path, rule.rule);
    }
    println!("shape: {}", compiled.artifacts.data_shape);

    Ok(())
}
