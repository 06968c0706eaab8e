use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Subcommand;
use organisely_core::bot::BoxError;
use organisely_core::models::OrganiselyEvent;
use organisely_core::{ApiError, Bot, BotConfig, ErrorCode};
use serde_json::json;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum WebhookAction {
    /// Validate and normalize a webhook payload
    Handle {
        /// Payload file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
        /// Shared secret the payload must carry
        #[arg(long)]
        secret: Option<String>,
        /// HTTP method the payload arrived with
        #[arg(long, default_value = "POST")]
        method: String,
    },
}

pub async fn run(action: WebhookAction) -> CmdResult {
    match action {
        WebhookAction::Handle {
            file,
            secret,
            method,
        } => {
            let body = match file {
                Some(path) => std::fs::read(path)?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };

            let events: Arc<Mutex<Vec<OrganiselyEvent>>> = Arc::default();
            let sink = Arc::clone(&events);
            let bot = Bot::new(
                BotConfig {
                    webhook_secret: secret,
                    on_event: None,
                }
                .with_handler(move |event| {
                    let sink = Arc::clone(&sink);
                    async move {
                        sink.lock()
                            .map_err(|_| "event sink poisoned")?
                            .push(event);
                        Ok::<(), BoxError>(())
                    }
                }),
            );

            let reply = bot.api_handler(&method, &body).await;
            let events = events
                .lock()
                .map_err(|_| ApiError::internal("event sink poisoned"))?
                .clone();
            print_json(&json!({
                "status": reply.status,
                "response": reply.body,
                "events": events,
            }))?;

            if reply.status == 200 {
                Ok(())
            } else {
                Err(ApiError::new(
                    ErrorCode::WebhookFailed,
                    format!("webhook rejected with status {}", reply.status),
                )
                .with_status(reply.status)
                .into())
            }
        }
    }
}
