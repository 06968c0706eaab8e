//! Integration descriptors and the resolver's output types.

use std::collections::HashMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationKind {
    #[serde(rename = "oauth2")]
    OAuth2,
    Bot,
    Webhook,
}

impl IntegrationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationKind::OAuth2 => "oauth2",
            IntegrationKind::Bot => "bot",
            IntegrationKind::Webhook => "webhook",
        }
    }
}

impl std::fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    Draft,
    Active,
    Inactive,
    Suspended,
    PendingReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationCategory {
    Email,
    Calendar,
    Communication,
    Productivity,
    Custom,
}

/// A registered integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: IntegrationKind,
    pub status: IntegrationStatus,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub event_triggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: String,
    #[serde(default)]
    pub is_public: bool,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
    /// Ids of the base integrations this one builds on, in declaration order.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub is_base_integration: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<IntegrationCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
}

impl Integration {
    /// A draft integration owned by `user_id` with no scopes, events or bases.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: IntegrationKind,
        user_id: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            kind,
            status: IntegrationStatus::Draft,
            scopes: Vec::new(),
            event_triggers: Vec::new(),
            webhook_url: None,
            created_at: now.clone(),
            updated_at: now,
            user_id: user_id.into(),
            is_public: false,
            version: "1.0.0".to_string(),
            config_schema: None,
            metadata: None,
            extends: Vec::new(),
            is_base_integration: false,
            category: None,
            icon: None,
            documentation_url: None,
        }
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_triggers = events.into_iter().map(Into::into).collect();
        self
    }

    pub fn extending<I, S>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extends = bases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: IntegrationCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Body of `POST /integrations`, also produced by the resolver for extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIntegrationRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: IntegrationKind,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub event_triggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<Value>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub is_base_integration: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<IntegrationCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
}

/// Caller-supplied overrides for `create_extension`. Unset fields take the
/// defaults derived from the base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<IntegrationKind>,
    pub scopes: Option<Vec<String>>,
    pub event_triggers: Option<Vec<String>>,
    pub webhook_url: Option<String>,
    pub config_schema: Option<Value>,
    pub is_public: Option<bool>,
    pub category: Option<IntegrationCategory>,
    pub icon: Option<String>,
    pub documentation_url: Option<String>,
}

/// One resolved `extends` edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationDependency {
    pub base_integration_id: String,
    pub base_integration_name: String,
    pub required_scopes: Vec<String>,
    pub required_events: Vec<String>,
    pub optional_scopes: Vec<String>,
    pub optional_events: Vec<String>,
}

/// An integration flattened with its direct bases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedIntegration {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: IntegrationKind,
    /// Own scopes first, then each base's in `extends` order, deduplicated.
    pub all_scopes: IndexSet<String>,
    pub all_events: IndexSet<String>,
    pub dependencies: Vec<IntegrationDependency>,
    pub base_integrations: Vec<Integration>,
    pub is_standalone: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_serializes_under_type_key() {
        let integration = Integration::new("gmail", "Gmail", IntegrationKind::OAuth2, "u1");
        let value = serde_json::to_value(&integration).unwrap();
        assert_eq!(value["type"], "oauth2");
        assert_eq!(value["status"], "draft");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn descriptor_without_optional_lists_deserializes() {
        let integration: Integration = serde_json::from_value(json!({
            "id": "slack-bot",
            "name": "Slack Bot",
            "type": "bot",
            "status": "pending_review",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
            "user_id": "u1",
            "version": "0.2.0"
        }))
        .unwrap();
        assert_eq!(integration.kind, IntegrationKind::Bot);
        assert_eq!(integration.status, IntegrationStatus::PendingReview);
        assert!(integration.extends.is_empty());
        assert!(integration.event_triggers.is_empty());
        assert!(!integration.is_base_integration);
    }
}
