//! hsa-gateway: Home Security Assistant main binary
//!
//! Usage:
//!   hsa-gateway            - Start the HTTP server
//!   hsa-gateway --help     - Show help
//!   hsa-gateway --version  - Show version

use std::path::PathBuf;
use std::time::Duration;

use hsa_core::{ChatService, Config, SessionRegistry};
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// HTTP server
    Server,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match parse_args(&args) {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("hsa-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Initialize logging
    let (dotenv, filter) = load_env_filter(dotenvy::dotenv)?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("Error loading .env file: {}", e),
    }

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting {}...", config.server.app_name);
    tracing::info!("Model: {}", config.gemini.model);
    if config.gemini.api_key().is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; chat requests will fail until it is provided");
    }

    run_server(config).await
}

/// Parse command line arguments
fn parse_args(args: &[String]) -> RunMode {
    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("hsa-gateway - Home Security Assistant");
    println!();
    println!("Usage:");
    println!("  hsa-gateway           Start the HTTP server");
    println!("  hsa-gateway --help    Show this help message");
    println!("  hsa-gateway --version Show version");
    println!();
    println!("Environment Variables:");
    println!("  GEMINI_API_KEY                 Gemini API key (required for chat)");
    println!("  GEMINI_MODEL                   Model name (default: gemini-2.0-flash)");
    println!("  GEMINI_BASE_URL                Custom API endpoint");
    println!("  GEMINI_TIMEOUT_SECS            Request timeout (default: none)");
    println!("  PORT                           HTTP port (default: 3000)");
    println!("  STATIC_DIR                     Static files directory (default: ./static)");
    println!("  SESSION_IDLE_TIMEOUT_SECS      Drop sessions idle this long (default: never)");
    println!("  SESSION_CLEANUP_INTERVAL_SECS  Cleanup interval (default: 300)");
}

/// Run the `.env` loader, then build the log filter so a `RUST_LOG` set in
/// `.env` is honored. The loader outcome is returned for logging once the
/// subscriber is up.
fn load_env_filter(
    load_dotenv: impl FnOnce() -> dotenvy::Result<PathBuf>,
) -> anyhow::Result<(dotenvy::Result<PathBuf>, EnvFilter)> {
    let dotenv = load_dotenv();
    let filter = EnvFilter::from_default_env().add_directive("info".parse()?);
    Ok((dotenv, filter))
}

/// Run the HTTP server until Ctrl+C
async fn run_server(config: Config) -> anyhow::Result<()> {
    let sessions = SessionRegistry::new();

    let mut service_handles = Vec::new();

    match config.session.idle_timeout_secs {
        Some(idle) => {
            let every = Duration::from_secs(config.session.cleanup_interval_secs);
            service_handles.push(sessions.start_cleanup_task(Duration::from_secs(idle), every));
            tracing::info!("Sessions idle for {}s will be evicted", idle);
        }
        None => tracing::info!("Session eviction disabled; sessions live until shutdown"),
    }

    let chat = ChatService::new(&config, sessions);

    let mut server = tokio::spawn(hsa_api::start_server(config, chat));

    tracing::info!("Press Ctrl+C to exit");

    // Wait for shutdown signal or an early server exit
    let server_exit = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutting down...");
            server.abort();
            None
        }
        result = &mut server => Some(result),
    };

    for handle in service_handles {
        handle.abort();
    }

    match server_exit {
        None => {
            tracing::info!("Shutdown complete");
            Ok(())
        }
        Some(Ok(result)) => result.map_err(|e| e.context("HTTP server error")),
        Some(Err(e)) => Err(anyhow::anyhow!("HTTP server task failed: {}", e)),
    }
}
