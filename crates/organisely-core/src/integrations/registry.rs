//! In-memory integration registry.
//!
//! Integrations may extend base integrations and inherit their scopes and
//! event triggers. Resolution dereferences exactly one level: a base's own
//! `extends` list is never followed.

use std::collections::HashMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{event_types, scopes};
use crate::error::RegistryError;
use crate::models::{
    CreateIntegrationRequest, ExtensionConfig, Integration, IntegrationCategory,
    IntegrationDependency, IntegrationKind, IntegrationStatus, ResolvedIntegration,
};

const DOCS_BASE_URL: &str = "https://organisely.com/docs/integrations";

/// Outcome of [`IntegrationRegistry::validate_dependencies`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Registry of integrations keyed by id. Re-adding an id replaces the entry.
#[derive(Debug, Clone)]
pub struct IntegrationRegistry {
    integrations: HashMap<String, Integration>,
}

impl Default for IntegrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrationRegistry {
    /// Registry seeded with the email, calendar and habits base integrations.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for base in seed_bases() {
            registry.add(base);
        }
        registry
    }

    /// Registry with no entries at all.
    pub fn empty() -> Self {
        Self {
            integrations: HashMap::new(),
        }
    }

    pub fn add(&mut self, integration: Integration) {
        debug!(id = %integration.id, extends = ?integration.extends, "Registering integration");
        self.integrations.insert(integration.id.clone(), integration);
    }

    pub fn get(&self, id: &str) -> Option<&Integration> {
        self.integrations.get(id)
    }

    pub fn len(&self) -> usize {
        self.integrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }

    /// Flatten `id` with its direct bases. `None` when `id` is unknown.
    ///
    /// Bases missing from the registry are skipped. `is_standalone` reflects
    /// the declared `extends` list, not which bases were found.
    pub fn resolve(&self, id: &str) -> Option<ResolvedIntegration> {
        let integration = self.integrations.get(id)?;

        let mut all_scopes: IndexSet<String> = integration.scopes.iter().cloned().collect();
        let mut all_events: IndexSet<String> =
            integration.event_triggers.iter().cloned().collect();
        let mut dependencies = Vec::new();
        let mut base_integrations = Vec::new();

        for base_id in &integration.extends {
            let Some(base) = self.integrations.get(base_id) else {
                debug!(id, base_id = %base_id, "Skipping unregistered base integration");
                continue;
            };

            all_scopes.extend(base.scopes.iter().cloned());
            all_events.extend(base.event_triggers.iter().cloned());
            dependencies.push(IntegrationDependency {
                base_integration_id: base.id.clone(),
                base_integration_name: base.name.clone(),
                required_scopes: base.scopes.clone(),
                required_events: base.event_triggers.clone(),
                optional_scopes: Vec::new(),
                optional_events: Vec::new(),
            });
            base_integrations.push(base.clone());
        }

        Some(ResolvedIntegration {
            id: integration.id.clone(),
            name: integration.name.clone(),
            kind: integration.kind,
            all_scopes,
            all_events,
            dependencies,
            base_integrations,
            is_standalone: integration.extends.is_empty(),
        })
    }

    /// Whether `granted` covers every scope `id` needs once resolved.
    /// Exact string match; unknown ids are never installable.
    pub fn can_install<S: AsRef<str>>(&self, id: &str, granted: &[S]) -> bool {
        let Some(resolved) = self.resolve(id) else {
            return false;
        };
        let granted: IndexSet<&str> = granted.iter().map(AsRef::as_ref).collect();
        resolved
            .all_scopes
            .iter()
            .all(|scope| granted.contains(scope.as_str()))
    }

    /// Every integration flagged as a base.
    pub fn base_integrations(&self) -> Vec<&Integration> {
        let mut bases: Vec<&Integration> = self
            .integrations
            .values()
            .filter(|i| i.is_base_integration)
            .collect();
        bases.sort_by(|a, b| a.id.cmp(&b.id));
        bases
    }

    /// Integrations that list `base_id` in `extends`.
    pub fn extensions_of(&self, base_id: &str) -> Vec<&Integration> {
        let mut extensions: Vec<&Integration> = self
            .integrations
            .values()
            .filter(|i| i.extends.iter().any(|b| b == base_id))
            .collect();
        extensions.sort_by(|a, b| a.id.cmp(&b.id));
        extensions
    }

    /// Build a creation request for an integration extending `base_id`.
    ///
    /// # Errors
    /// [`RegistryError::BaseNotFound`] when `base_id` is not registered.
    pub fn create_extension(
        &self,
        base_id: &str,
        config: ExtensionConfig,
    ) -> Result<CreateIntegrationRequest, RegistryError> {
        let base = self
            .integrations
            .get(base_id)
            .ok_or_else(|| RegistryError::BaseNotFound(base_id.to_string()))?;

        Ok(CreateIntegrationRequest {
            name: config
                .name
                .unwrap_or_else(|| format!("Extended {}", base.name)),
            description: Some(
                config
                    .description
                    .unwrap_or_else(|| format!("Extension of {}", base.name)),
            ),
            kind: config.kind.unwrap_or(IntegrationKind::OAuth2),
            scopes: config.scopes.unwrap_or_default(),
            event_triggers: config.event_triggers.unwrap_or_default(),
            webhook_url: config.webhook_url,
            config_schema: config.config_schema,
            is_public: config.is_public.unwrap_or(false),
            extends: vec![base_id.to_string()],
            is_base_integration: false,
            category: config.category.or(base.category),
            icon: config.icon,
            documentation_url: config.documentation_url,
        })
    }

    /// Check every base `request` extends. Overlapping scopes or events are
    /// warnings and never affect `valid`.
    pub fn validate_dependencies(&self, request: &CreateIntegrationRequest) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for base_id in &request.extends {
            let Some(base) = self.integrations.get(base_id) else {
                errors.push(format!("Base integration {base_id} not found"));
                continue;
            };
            if !base.is_base_integration {
                errors.push(format!("{base_id} is not a base integration"));
                continue;
            }

            let overlapping_scopes = overlap(&request.scopes, &base.scopes);
            if !overlapping_scopes.is_empty() {
                warnings.push(format!(
                    "Scopes {} are already provided by base integration {base_id}",
                    overlapping_scopes.join(", ")
                ));
            }

            let overlapping_events = overlap(&request.event_triggers, &base.event_triggers);
            if !overlapping_events.is_empty() {
                warnings.push(format!(
                    "Events {} are already provided by base integration {base_id}",
                    overlapping_events.join(", ")
                ));
            }
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Entries of `own` also present in `base`, in `own` order.
fn overlap<'a>(own: &'a [String], base: &[String]) -> Vec<&'a str> {
    own.iter()
        .filter(|item| base.contains(item))
        .map(String::as_str)
        .collect()
}

fn seed_bases() -> Vec<Integration> {
    let base = |id: &str, name: &str, description: &str, category, icon: &str, docs: &str| {
        let mut integration = Integration::new(id, name, IntegrationKind::OAuth2, "system")
            .with_category(category);
        integration.description = Some(description.to_string());
        integration.status = IntegrationStatus::Active;
        integration.is_public = true;
        integration.is_base_integration = true;
        integration.icon = Some(icon.to_string());
        integration.documentation_url = Some(format!("{DOCS_BASE_URL}/{docs}"));
        integration
    };

    vec![
        base(
            "email-base",
            "Email",
            "Base email integration providing core email functionality",
            IntegrationCategory::Email,
            "\u{1F4E7}",
            "email",
        )
        .with_scopes([scopes::READ_EMAILS, scopes::WRITE_EMAILS])
        .with_events([event_types::EMAIL_RECEIVED, event_types::EMAIL_SENT]),
        base(
            "calendar-base",
            "Calendar",
            "Base calendar integration providing core calendar functionality",
            IntegrationCategory::Calendar,
            "\u{1F4C5}",
            "calendar",
        )
        .with_scopes([scopes::READ_CALENDAR, scopes::WRITE_CALENDAR])
        .with_events([
            event_types::CALENDAR_EVENT_CREATED,
            event_types::CALENDAR_EVENT_UPDATED,
            event_types::CALENDAR_EVENT_DELETED,
        ]),
        base(
            "habits-base",
            "Habits",
            "Base habits integration providing core habit tracking functionality",
            IntegrationCategory::Productivity,
            "\u{1F3AF}",
            "habits",
        )
        .with_scopes([scopes::READ_HABITS, scopes::WRITE_HABITS])
        .with_events([
            event_types::HABIT_CREATED,
            event_types::HABIT_COMPLETED,
            event_types::HABIT_STREAK_MILESTONE,
        ]),
    ]
}
