use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod import;
mod logging;
mod util;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    command: UnmediumCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct ImportArgs {
    /// The path to the configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Directory to write documents into (overrides `content_dir`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Canonical URLs of the articles to import
    #[arg(required = true)]
    urls: Vec<String>,
}

#[derive(Parser)]
struct DraftArgs {
    /// The path to the configuration file
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Directory to write documents into (overrides `content_dir`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exported draft HTML files
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum UnmediumCommand {
    /// Write a default unmedium.yaml
    Init(InitArgs),

    /// Import published articles by URL
    Import(ImportArgs),

    /// Import drafts from a Medium export
    Draft(DraftArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    logging::init_tracing(args.verbose);

    match args.command {
        UnmediumCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        UnmediumCommand::Import(args) => {
            commands::import::run(&args).await?;
        }
        UnmediumCommand::Draft(args) => {
            commands::draft::run(&args).await?;
        }
    }

    Ok(())
}
