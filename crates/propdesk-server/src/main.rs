// crates/propdesk-server/src/main.rs
// ============================================================================
// Module: PropDesk Server Entry Point
// Description: Startup wiring for the PropDesk HTTP API.
// Purpose: Load configuration, assemble shared state, and serve requests.
// Dependencies: propdesk-agent, propdesk-core, propdesk-server, axum, tokio
// ============================================================================

//! ## Overview
//! The binary loads [`ServerConfig`], constructs the shared store, vendor
//! directory, reasoning provider, and tool catalog, then serves the axum
//! router until the process is stopped. Startup failures print one line to
//! stderr and exit non-zero; nothing after successful bind is
//! process-fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;

use propdesk_agent::HttpReasoningProvider;
use propdesk_agent::ProviderSettings;
use propdesk_agent::ToolCatalog;
use propdesk_core::InMemoryTicketStore;
use propdesk_core::SharedClock;
use propdesk_core::SystemClock;
use propdesk_server::AppState;
use propdesk_server::NoopMetrics;
use propdesk_server::ServerConfig;
use propdesk_server::StaticVendorDirectory;
use propdesk_server::router;
use propdesk_server::seed;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Startup and serve failures.
#[derive(Debug, Error)]
enum ServerError {
    /// Configuration could not be loaded or validated.
    #[error("config: {0}")]
    Config(String),
    /// A collaborator could not be constructed.
    #[error("init: {0}")]
    Init(String),
    /// The listener could not bind or the server failed.
    #[error("serve: {0}")]
    Serve(String),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Server entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            write_stderr_line(&format!("propdesk-server: {err}"));
            ExitCode::FAILURE
        }
    }
}

/// Loads configuration, assembles state, and serves until stopped.
async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load(None).map_err(|err| ServerError::Config(err.to_string()))?;
    let addr = config.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
    let state = build_state(&config)?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ServerError::Serve(format!("bind {addr} failed: {err}")))?;
    write_stderr_line(&format!("propdesk-server: listening on {addr}"));
    axum::serve(listener, router(state))
        .await
        .map_err(|err| ServerError::Serve(err.to_string()))
}

/// Constructs the shared application state from configuration.
fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let settings = ProviderSettings::named(&config.provider.name)
        .map_err(|err| ServerError::Config(err.to_string()))?;
    let provider =
        HttpReasoningProvider::new(settings).map_err(|err| ServerError::Init(err.to_string()))?;
    let catalog = ToolCatalog::standard().map_err(|err| ServerError::Init(err.to_string()))?;

    let clock: SharedClock = Arc::new(SystemClock);
    let store = if config.seed_demo_data {
        InMemoryTicketStore::with_seed(Arc::clone(&clock), seed::seed_tickets(clock.now()))
    } else {
        InMemoryTicketStore::new(Arc::clone(&clock))
    };

    Ok(AppState {
        store: Arc::new(store),
        directory: Arc::new(StaticVendorDirectory),
        provider: Arc::new(provider),
        catalog: Arc::new(catalog),
        clock,
        metrics: Arc::new(NoopMetrics),
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stderr, ignoring output failures.
fn write_stderr_line(line: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{line}");
}
