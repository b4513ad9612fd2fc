//! Tango CLI - command-line interface for schema documents
//!
//! This CLI lets developers work with schemas outside a host application:
//! - Validate a schema document
//! - Print the layout as an outline
//! - Move an element through the engine's drop rules
//! - Evaluate a hyper value against a scope

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;

use commands::{eval, schema};
use error::CliResult;
use tango_engine::EngineConfig;

/// Tango CLI application
#[derive(Parser)]
#[command(name = "tango")]
#[command(about = "Tango - schema-driven UI composition engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, env = "TANGO_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Check that a schema document forms a single valid tree
    Validate {
        /// Schema file (JSON)
        schema: PathBuf,
    },

    /// Print the layout of a schema as an indented outline
    Tree {
        /// Schema file (JSON)
        schema: PathBuf,
    },

    /// Move an element and print the resulting schema
    #[command(name = "move")]
    Move {
        /// Schema file (JSON)
        schema: PathBuf,

        /// Element to move
        id: String,

        /// New parent element
        parent: String,

        /// Position among the new parent's children
        index: usize,

        /// Materials file (JSON array) supplying drop rules
        #[arg(short, long)]
        materials: Option<PathBuf>,
    },

    /// Evaluate a hyper value such as '{"type":"expression","value":"a + 1"}'
    Eval {
        /// Hyper value document (JSON)
        value: String,

        /// Execution scope (JSON object)
        #[arg(short, long)]
        scope: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    match run(cli) {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<String> {
    let config = EngineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { schema } => schema::validate(&commands::read_schema(&schema)?),
        Commands::Tree { schema } => schema::tree(&commands::read_schema(&schema)?),
        Commands::Move {
            schema,
            id,
            parent,
            index,
            materials,
        } => {
            let materials = match materials {
                Some(path) => commands::read_materials(&path)?,
                None => Vec::new(),
            };
            let edited = schema::move_element(
                commands::read_schema(&schema)?,
                materials,
                config,
                &id.as_str().into(),
                &parent.as_str().into(),
                index,
            )?;
            Ok(serde_json::to_string_pretty(&edited)?)
        }
        Commands::Eval { value, scope } => eval::eval(&value, scope.as_deref(), config),
    }
}
