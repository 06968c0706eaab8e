use clap::Subcommand;
use organisely_core::{ClientConfig, ConfigError};

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "base_url", "retries", "headers.X-Team")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Show the stored configuration
    Show,
    /// Print the config file location
    Path,
    /// Reset config to defaults
    Reset,
}

pub fn run(ctx: &Context, action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let config = ctx.stored_config()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(ConfigError::UnknownKey(key).into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let path = ctx.config_path()?;
            let mut config = ClientConfig::load_from(&path)?;
            config.set(&key, &value)?;
            config.save_to(&path)?;
            println!("ok");
        }
        ConfigAction::Show => {
            let mut config = ctx.stored_config()?;
            if config.api_key.is_some() {
                config.api_key = Some("***".to_string());
            }
            print_json(&config)?;
        }
        ConfigAction::Path => {
            println!("{}", ctx.config_path()?.display());
        }
        ConfigAction::Reset => {
            ClientConfig::default().save_to(&ctx.config_path()?)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
