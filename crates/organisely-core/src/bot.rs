//! Webhook-to-event dispatch.
//!
//! [`Bot`] validates an optional shared secret on incoming webhook payloads,
//! normalizes them into [`OrganiselyEvent`]s and awaits an async callback.
//! [`Bot::respond`] and [`Bot::api_handler`] are framework-neutral adapters
//! returning a status code plus JSON body.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::event_types;
use crate::models::OrganiselyEvent;
use crate::response::ApiResponse;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Callback awaited once per accepted webhook.
pub type EventHandler =
    Box<dyn Fn(OrganiselyEvent) -> BoxFuture<Result<(), BoxError>> + Send + Sync>;

/// Incoming webhook body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotWebhookPayload {
    pub event: String,
    #[serde(default)]
    pub data: Value,
    pub user_id: String,
    pub timestamp: String,
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl BotWebhookPayload {
    /// Payload stamped with a fresh event id and the current time.
    pub fn new(event: impl Into<String>, user_id: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
            user_id: user_id.into(),
            timestamp: Utc::now().to_rfc3339(),
            event_id: Uuid::new_v4().to_string(),
            correlation_id: None,
            secret: None,
        }
    }
}

#[derive(Default)]
pub struct BotConfig {
    /// When set, payloads must carry exactly this secret.
    pub webhook_secret: Option<String>,
    pub on_event: Option<EventHandler>,
}

impl BotConfig {
    /// Boxes an async closure as the event callback.
    pub fn with_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(OrganiselyEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.on_event = Some(Box::new(
            move |event: OrganiselyEvent| -> BoxFuture<Result<(), BoxError>> {
                Box::pin(handler(event))
            },
        ));
        self
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "***"))
            .field("on_event", &self.on_event.is_some())
            .finish()
    }
}

/// Status code and JSON body for a host framework to send back.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookReply {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct Bot {
    config: BotConfig,
}

impl Bot {
    pub fn new(config: BotConfig) -> Self {
        Self { config }
    }

    /// Validate, normalize and dispatch one payload.
    pub async fn handle_webhook(&self, payload: BotWebhookPayload) -> ApiResponse<()> {
        if let Some(expected) = &self.config.webhook_secret {
            if payload.secret.as_deref() != Some(expected.as_str()) {
                warn!(event = %payload.event, "Rejected webhook with invalid secret");
                return ApiResponse::failure("Invalid webhook secret");
            }
        }

        let event = to_event(payload);
        let event_id = event.id.clone();
        debug!(event_id = %event_id, event_type = %event.event_type, "Dispatching webhook event");

        if let Some(handler) = &self.config.on_event {
            if let Err(e) = handler(event).await {
                warn!(event_id = %event_id, "Event handler failed: {}", e);
                return ApiResponse::failure(e.to_string());
            }
        }

        ApiResponse::succeeded()
    }

    pub async fn handle_habit_completed(&self, user_id: &str, habit: Value) -> ApiResponse<()> {
        self.handle_webhook(BotWebhookPayload::new(
            event_types::HABIT_COMPLETED,
            user_id,
            habit,
        ))
        .await
    }

    pub async fn handle_email_received(&self, user_id: &str, email: Value) -> ApiResponse<()> {
        self.handle_webhook(BotWebhookPayload::new(
            event_types::EMAIL_RECEIVED,
            user_id,
            email,
        ))
        .await
    }

    pub async fn handle_calendar_event_upcoming(
        &self,
        user_id: &str,
        event: Value,
    ) -> ApiResponse<()> {
        self.handle_webhook(BotWebhookPayload::new(
            event_types::CALENDAR_EVENT_UPCOMING,
            user_id,
            event,
        ))
        .await
    }

    /// Generic adapter: 200 on success, 400 on rejection or a malformed body.
    pub async fn respond(&self, body: &[u8]) -> WebhookReply {
        let result = match serde_json::from_slice::<BotWebhookPayload>(body) {
            Ok(payload) => self.handle_webhook(payload).await,
            Err(e) => {
                debug!("Malformed webhook payload: {}", e);
                ApiResponse::failure(format!("Invalid webhook payload: {e}"))
            }
        };

        let status = if result.success { 200 } else { 400 };
        let body = serde_json::to_value(&result)
            .unwrap_or_else(|_| json!({"success": false, "error": "Internal server error"}));
        WebhookReply { status, body }
    }

    /// POST-only adapter; any other method gets 405.
    pub async fn api_handler(&self, method: &str, body: &[u8]) -> WebhookReply {
        if !method.eq_ignore_ascii_case("POST") {
            return WebhookReply {
                status: 405,
                body: json!({"error": "Method not allowed"}),
            };
        }
        self.respond(body).await
    }
}

fn to_event(payload: BotWebhookPayload) -> OrganiselyEvent {
    let correlation = payload
        .correlation_id
        .clone()
        .map(Value::String)
        .unwrap_or(Value::Null);
    let metadata = HashMap::from([
        ("source".to_string(), Value::String("webhook".to_string())),
        ("correlation_id".to_string(), correlation),
    ]);

    OrganiselyEvent {
        id: Uuid::new_v4().to_string(),
        event_type: payload.event,
        event_data: payload.data,
        user_id: Some(payload.user_id),
        target_users: None,
        metadata,
        timestamp: payload.timestamp,
        created_at: Utc::now().to_rfc3339(),
        source: Some("bot".to_string()),
        correlation_id: payload.correlation_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn recording_bot(secret: Option<&str>) -> (Bot, Arc<Mutex<Vec<OrganiselyEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = BotConfig {
            webhook_secret: secret.map(str::to_string),
            on_event: None,
        }
        .with_handler(move |event| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(event);
                Ok(())
            }
        });
        (Bot::new(config), seen)
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected_without_dispatch() {
        let (bot, seen) = recording_bot(Some("s3cret"));
        let mut payload = BotWebhookPayload::new("habit.completed", "u1", json!({}));
        payload.secret = Some("guess".to_string());

        let result = bot.handle_webhook(payload).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid webhook secret"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_secret_is_rejected_when_configured() {
        let (bot, _) = recording_bot(Some("s3cret"));
        let result = bot
            .handle_webhook(BotWebhookPayload::new("x", "u1", Value::Null))
            .await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn accepted_payload_is_normalized_and_dispatched_once() {
        let (bot, seen) = recording_bot(Some("s3cret"));
        let mut payload = BotWebhookPayload::new("email.received", "u7", json!({"subject": "Hi"}));
        payload.secret = Some("s3cret".to_string());
        payload.correlation_id = Some("corr-1".to_string());
        let timestamp = payload.timestamp.clone();

        assert!(bot.handle_webhook(payload).await.success);

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.event_type, "email.received");
        assert_eq!(event.user_id.as_deref(), Some("u7"));
        assert_eq!(event.event_data, json!({"subject": "Hi"}));
        assert_eq!(event.timestamp, timestamp);
        assert_eq!(event.source.as_deref(), Some("bot"));
        assert_eq!(event.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(event.metadata["source"], "webhook");
        assert_eq!(event.metadata["correlation_id"], "corr-1");
        assert!(Uuid::parse_str(&event.id).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn handler_is_awaited_before_reply() {
        let done = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&done);
        let bot = Bot::new(BotConfig::default().with_handler(move |_event| {
            let flag = Arc::clone(&flag);
            async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                *flag.lock().unwrap() = true;
                Ok(())
            }
        }));

        let result = bot.handle_habit_completed("u1", json!({"habit_id": "h1"})).await;
        assert!(result.success);
        assert!(*done.lock().unwrap());
    }

    #[tokio::test]
    async fn handler_error_becomes_failure_envelope() {
        let bot = Bot::new(BotConfig::default().with_handler(|_event| async {
            Err::<(), BoxError>("downstream unavailable".into())
        }));
        let result = bot.handle_habit_completed("u1", json!({"habit_id": "h1"})).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("downstream unavailable"));
    }

    #[tokio::test]
    async fn helpers_use_their_event_types() {
        let (bot, seen) = recording_bot(None);
        bot.handle_habit_completed("u1", json!({})).await;
        bot.handle_email_received("u1", json!({})).await;
        bot.handle_calendar_event_upcoming("u1", json!({})).await;

        let types: Vec<String> = seen
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type.clone())
            .collect();
        assert_eq!(
            types,
            vec!["habit.completed", "email.received", "calendar.event_upcoming"]
        );
    }

    #[tokio::test]
    async fn respond_maps_outcome_to_status() {
        let (bot, _) = recording_bot(Some("k"));
        let ok = json!({
            "event": "habit.completed",
            "data": {"habit_id": "h1"},
            "userId": "u1",
            "timestamp": "2025-03-01T08:00:00Z",
            "eventId": "evt_1",
            "secret": "k"
        });
        let reply = bot.respond(ok.to_string().as_bytes()).await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, json!({"success": true}));

        let mut bad = ok.clone();
        bad["secret"] = json!("nope");
        let reply = bot.respond(bad.to_string().as_bytes()).await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body["error"], "Invalid webhook secret");

        let reply = bot.respond(b"not json").await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body["success"], false);
    }

    #[tokio::test]
    async fn api_handler_only_accepts_post() {
        let bot = Bot::default();
        let reply = bot.api_handler("GET", b"{}").await;
        assert_eq!(reply.status, 405);
        assert_eq!(reply.body, json!({"error": "Method not allowed"}));
    }
}
