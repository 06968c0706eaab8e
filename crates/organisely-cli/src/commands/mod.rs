use std::path::PathBuf;

use organisely_core::{ClientConfig, ConfigError, OrganiselyClient};
use serde::Serialize;

pub mod calendar;
pub mod config;
pub mod emails;
pub mod events;
pub mod habits;
pub mod integrations;
pub mod oauth;
pub mod user;
pub mod utility;
pub mod webhook;

pub type CmdResult = organisely_core::error::Result<()>;

/// Settings shared by every command.
pub struct Context {
    config_path: Option<PathBuf>,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => ClientConfig::path(),
        }
    }

    /// Stored configuration without environment overrides.
    pub fn stored_config(&self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::load_from(&self.config_path()?)
    }

    /// Stored configuration with `ORGANISELY_*` overrides applied.
    pub fn config(&self) -> Result<ClientConfig, ConfigError> {
        let mut config = self.stored_config()?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn client(&self) -> organisely_core::error::Result<OrganiselyClient> {
        Ok(OrganiselyClient::new(self.config()?)?)
    }
}

/// Pretty-print any serializable value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
