// src/main.rs

//! # Credential Registry - Main Entry Point
//!
//! Loads configuration, opens the event journal, replays it into the registry
//! and serves JSON-lines requests on stdin, writing responses to stdout.
//! Logs go to stderr (`RUST_LOG=info` for transition logs).
//!
//! ## Environment Variables
//! - `REGISTRY_ADMINISTRATOR`: administrator account address (required)
//! - `REGISTRY_JOURNAL_PATH`: (Optional) event journal file, in-memory when unset
//! - `REGISTRY_APPROVAL_POLICY`: (Optional) `idempotent` (default) or `strict`

use anyhow::{Context, Result};
use credential_registry::services::command_server::CommandServer;
use credential_registry::services::credential_issuer::CredentialIssuer;
use credential_registry::services::verifier::Verifier;
use credential_registry::settings::Settings;
use credential_registry::storage::event_journal::{EventJournal, FileJournal, MemoryJournal};
use credential_registry::CredentialRegistry;
use dotenv::dotenv;
use log::{info, warn};
use std::sync::Arc;
use tokio::io::BufReader;

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment and configuration
/// 2. Open the event journal and replay it
/// 3. Initialize service components
/// 4. Serve requests until stdin closes
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let settings = Settings::load()?;

    let journal: Box<dyn EventJournal> = match &settings.journal_path {
        Some(path) => Box::new(
            FileJournal::open(path)
                .with_context(|| format!("failed to open event journal {}", path.display()))?,
        ),
        None => {
            warn!("REGISTRY_JOURNAL_PATH not set; events will not survive a restart");
            Box::new(MemoryJournal::new())
        }
    };

    let registry = Arc::new(
        CredentialRegistry::open(settings.administrator, settings.approval_policy, journal)
            .context("failed to replay event journal")?,
    );

    let server = CommandServer::new(
        CredentialIssuer::new(registry.clone()),
        Verifier::new(registry),
    );

    info!("credential registry ready, reading requests from stdin");
    server
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("command server I/O failure")?;

    info!("stdin closed, shutting down");
    Ok(())
}
