// src/settings.rs
//! Runtime configuration.
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Optional `registry.{toml,yaml,json}` in the working directory
//! 2. `REGISTRY_*` environment variables (a `.env` file is loaded first)
//!
//! ## Keys
//! - `administrator` / `REGISTRY_ADMINISTRATOR`: account allowed to manage issuers (required)
//! - `journal_path` / `REGISTRY_JOURNAL_PATH`: event journal file; in-memory when unset
//! - `approval_policy` / `REGISTRY_APPROVAL_POLICY`: `idempotent` (default) or `strict`

use crate::contracts::registry_state::ApprovalPolicy;
use crate::models::{AccountId, ZERO_ACCOUNT};
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub administrator: AccountId,
    #[serde(default)]
    pub journal_path: Option<PathBuf>,
    #[serde(default)]
    pub approval_policy: ApprovalPolicy,
}

impl Settings {
    /// Loads settings from the config file and environment.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("registry").required(false))
            .add_source(Environment::with_prefix("REGISTRY"))
            .build()
            .context("failed to read registry configuration")?;
        Self::from_config(config)
    }

    /// Deserializes and validates an already-built configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config
            .try_deserialize()
            .context("invalid registry configuration")?;
        if settings.administrator == ZERO_ACCOUNT {
            bail!("administrator must not be the zero account");
        }
        Ok(settings)
    }
}
