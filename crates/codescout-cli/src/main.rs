//! codescout CLI - extract code definitions as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use codescout_core::{
    CodeParserService, Config, ExtractDefinitionsTool, ExtractRequest, Language,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "codescout")]
#[command(version)]
#[command(about = "Extract classes, functions and methods from source files", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract definitions from a file or directory
    Extract {
        /// File to extract from (a directory is walked)
        path: Option<PathBuf>,

        /// Directory to walk
        #[arg(short, long, conflicts_with = "path")]
        dir: Option<PathBuf>,

        /// Walk into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Include hidden files and directories
        #[arg(long)]
        hidden: bool,

        /// Do not honor .gitignore and .ignore files
        #[arg(long)]
        no_gitignore: bool,

        /// Only extract files with this extension (repeatable)
        #[arg(short, long = "ext")]
        ext: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List supported languages and their extensions
    Languages,
    /// Print the default configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins, then --verbose, then the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
        EnvFilter::new(level)
    });
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();

    tracing::debug!(?config, "Configuration loaded");

    let result = match cli.command {
        Commands::Extract {
            path,
            dir,
            recursive,
            hidden,
            no_gitignore,
            ext,
            pretty,
        } => {
            let request = build_request(path, dir, recursive, hidden, no_gitignore, ext);
            extract(config, &request, pretty)
        }
        Commands::Languages => {
            languages();
            Ok(())
        }
        Commands::Config => {
            print!("{}", Config::default_config_string());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn build_request(
    path: Option<PathBuf>,
    dir: Option<PathBuf>,
    recursive: bool,
    hidden: bool,
    no_gitignore: bool,
    ext: Vec<String>,
) -> ExtractRequest {
    let mut request = match (path, dir) {
        (Some(path), _) if path.is_dir() => ExtractRequest::directory(path.to_string_lossy()),
        (Some(path), _) => ExtractRequest::file(path.to_string_lossy()),
        (None, Some(dir)) => ExtractRequest::directory(dir.to_string_lossy()),
        (None, None) => ExtractRequest::default(),
    };

    // Unset flags defer to the config file
    if recursive {
        request = request.recursive(true);
    }
    if hidden {
        request = request.include_hidden(true);
    }
    if no_gitignore {
        request = request.respect_gitignore(false);
    }
    if !ext.is_empty() {
        request = request.file_extensions(ext);
    }
    request
}

fn extract(config: Config, request: &ExtractRequest, pretty: bool) -> Result<(), serde_json::Error> {
    let service = Arc::new(CodeParserService::new());
    let tool = ExtractDefinitionsTool::with_service(service, config.extraction);
    let response = tool.execute(request);

    println!("{}", response.to_json(pretty)?);
    Ok(())
}

fn languages() {
    for language in Language::ALL {
        println!("{:<12} {}", language.name(), language.extensions().join(", "));
    }
}
