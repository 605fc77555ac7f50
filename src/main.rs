use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use js_outline::{Config, Extractor, ProjectIndex};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const STDIN_PATH: &str = "<stdin>";

#[derive(Parser)]
#[command(author, version, about = "JS/TS declaration outline extractor", long_about = None)]
struct Cli {
    /// JSON config file (parser syntax switches, index filters)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract imports, functions, classes and methods from one file
    Extract(ExtractArgs),
    /// Extract every JS/TS file under a directory
    Index(IndexArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// File to extract, or `-` to read source from STDIN
    path: PathBuf,
}

#[derive(Args, Debug)]
struct IndexArgs {
    /// Project root to walk
    root: PathBuf,
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

fn main() -> Result<()> {
    // stdout carries the JSON; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path).context("failed to load config")?,
        None => Config::default(),
    };
    let extractor = Extractor::new(config.parser);

    let json = match cli.command {
        Commands::Extract(args) => {
            let result = if args.path.to_str() == Some("-") {
                let mut src = String::new();
                io::stdin()
                    .read_to_string(&mut src)
                    .context("failed to read from STDIN")?;
                extractor.extract(STDIN_PATH, &src)
            } else {
                extractor.extract_file(&args.path)?
            };
            to_json(&result, cli.pretty)?
        }
        Commands::Index(args) => {
            let index = ProjectIndex::build(&args.root, &config.index, &extractor);
            index.to_json(cli.pretty)?
        }
    };

    println!("{json}");
    Ok(())
}
