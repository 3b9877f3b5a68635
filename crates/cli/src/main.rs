//! Luneva CLI - content tooling.
//!
//! # Usage
//!
//! ```bash
//! # List the studio document types by desk group
//! luneva schema
//!
//! # Preview labels for an exported document (or an array of documents)
//! luneva preview export/hero.json
//!
//! # Font stylesheet for a settings document
//! luneva fonts export/settings.yaml
//!
//! # Resolve a header or footer document's links
//! luneva links export/header.json --domain luneva.com
//! ```
//!
//! Documents are read as JSON, or as YAML when the file ends in `.yaml` or
//! `.yml`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "luneva")]
#[command(author, version, about = "Luneva content tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the studio document types
    Schema,
    /// Compute studio preview labels for a document file
    Preview {
        /// JSON or YAML document, or an array of documents
        file: PathBuf,
    },
    /// Emit the font stylesheet for a settings document
    Fonts {
        /// JSON or YAML settings document
        file: PathBuf,
    },
    /// Resolve the links of a header or footer document
    Links {
        /// JSON or YAML header or footer document
        file: PathBuf,

        /// Storefront domain whose absolute URLs are rewritten to paths
        /// (repeatable; defaults to the configured storefront domains)
        #[arg(short, long)]
        domain: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "luneva_cli=info,luneva_storefront=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Schema => commands::schema::run(),
        Commands::Preview { file } => commands::preview::run(&file).await,
        Commands::Fonts { file } => commands::fonts::run(&file).await,
        Commands::Links { file, domain } => commands::links::run(&file, domain).await,
    }
}
