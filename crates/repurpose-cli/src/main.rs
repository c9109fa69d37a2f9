//! repurpose - command-line client for the content repurposing backend.
//!
//! Upload source material, generate platform-specific rewrites and manage
//! brand voices from the terminal. Sessions persist between runs and are
//! refreshed transparently when the access token expires.

mod app;
mod args;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repurpose_core::storage::StorageKind;
use repurpose_core::{Config, Notice};

use app::App;
use args::Args;

/// Log file name inside the configured log directory
const LOG_FILE_NAME: &str = "repurpose.log";

const USAGE: &str = "\
Usage: repurpose [OPTIONS] <COMMAND> [ARGS]

Commands:
  login [EMAIL]                       Log in (password is prompted)
  register                            Create an account and log in
  logout                              Forget the stored session
  whoami                              Verify the session and show the profile
  dashboard                           Recent content and generations
  route PATH                          Show what the route guard decides for PATH
  content list [--skip N] [--limit N]
  content show ID
  content text [--title T] TEXT...    (or --stdin)
  content url [--title T] URL
  content file [--title T] PATH
  content delete ID
  generate ID --platforms twitter,linkedin [--tone T] [--voice ID]
  history [--skip N] [--limit N]
  generation show|delete ID
  regenerate ID [--tone T]
  voices list|show|create|update|default|delete

Options:
  --api-url URL          Backend base URL (env: REPURPOSE_API_URL)
  --refresh-policy P     per-request | single-flight
  --storage KIND         file | keyring | memory
  -h, --help             Show this help

Set RUST_LOG=debug for verbose logs.";

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr. When a log directory is configured they are also
/// written to a file there; the returned guard flushes it on drop.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(raw) = args.option("storage") {
        config.storage = StorageKind::from_str(raw)
            .ok_or_else(|| anyhow::anyhow!("Unknown storage backend: {}", raw))?;
    }

    let _log_guard = init_tracing(&config);
    info!("repurpose starting");

    let mut app = App::new(config, &args)?;
    app.run(&args).await
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    if args.switch("help") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Command failed");
            eprintln!("{}", Notice::from_error(&e, &e.to_string()));
            ExitCode::FAILURE
        }
    }
}
