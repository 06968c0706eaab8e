use std::path::{Path, PathBuf};

use clap::Subcommand;
use organisely_core::models::{ExtensionConfig, Integration};
use organisely_core::error::Result;
use organisely_core::{IntegrationRegistry, RegistryError};
use serde_json::json;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum IntegrationAction {
    /// List base integrations in the local registry
    Bases {
        /// JSON file with extra integrations to register
        #[arg(long)]
        registry: Option<PathBuf>,
    },
    /// Flatten an integration with its base integrations
    Resolve {
        id: String,
        #[arg(long)]
        registry: Option<PathBuf>,
    },
    /// Check whether granted scopes cover an integration
    CanInstall {
        id: String,
        /// Comma-separated granted scopes
        #[arg(long, value_delimiter = ',')]
        scopes: Vec<String>,
        #[arg(long)]
        registry: Option<PathBuf>,
    },
    /// Draft an extension of a base integration and validate it
    Extend {
        base: String,
        #[arg(long)]
        name: Option<String>,
        /// Comma-separated extra scopes
        #[arg(long, value_delimiter = ',')]
        scopes: Vec<String>,
        #[arg(long)]
        registry: Option<PathBuf>,
    },
    /// List integrations installed for a user (remote)
    List {
        #[arg(long)]
        user: Option<String>,
    },
    /// Fetch one integration (remote)
    Get { id: String },
}

/// Seeded registry plus any integrations listed in `extra`.
fn load_registry(extra: Option<&Path>) -> Result<IntegrationRegistry> {
    let mut registry = IntegrationRegistry::new();
    if let Some(path) = extra {
        let content = std::fs::read_to_string(path)?;
        let integrations: Vec<Integration> = serde_json::from_str(&content)?;
        for integration in integrations {
            registry.add(integration);
        }
    }
    Ok(registry)
}

pub async fn run(ctx: &Context, action: IntegrationAction) -> CmdResult {
    match action {
        IntegrationAction::Bases { registry } => {
            let registry = load_registry(registry.as_deref())?;
            let bases: Vec<_> = registry
                .base_integrations()
                .into_iter()
                .map(|b| json!({"id": b.id, "name": b.name, "scopes": b.scopes}))
                .collect();
            print_json(&bases)
        }
        IntegrationAction::Resolve { id, registry } => {
            let registry = load_registry(registry.as_deref())?;
            let resolved = registry
                .resolve(&id)
                .ok_or(RegistryError::IntegrationNotFound(id))?;
            print_json(&resolved)
        }
        IntegrationAction::CanInstall {
            id,
            scopes,
            registry,
        } => {
            let registry = load_registry(registry.as_deref())?;
            println!("{}", registry.can_install(&id, &scopes));
            Ok(())
        }
        IntegrationAction::Extend {
            base,
            name,
            scopes,
            registry,
        } => {
            let registry = load_registry(registry.as_deref())?;
            let config = ExtensionConfig {
                name,
                scopes: (!scopes.is_empty()).then_some(scopes),
                ..ExtensionConfig::default()
            };
            let request = registry.create_extension(&base, config)?;
            let validation = registry.validate_dependencies(&request);
            print_json(&json!({"request": request, "validation": validation}))
        }
        IntegrationAction::List { user } => {
            let response = ctx.client()?.get_integrations(user.as_deref()).await?;
            print_json(&response.data)
        }
        IntegrationAction::Get { id } => {
            print_json(&ctx.client()?.get_integration(&id).await?.data)
        }
    }
}
