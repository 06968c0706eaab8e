use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized event handed to bot callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganiselyEvent {
    pub id: String,
    pub event_type: String,
    pub event_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_users: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    pub timestamp: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackEventRequest {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl TrackEventRequest {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.event_data = Some(data);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BroadcastEventRequest {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_users: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
