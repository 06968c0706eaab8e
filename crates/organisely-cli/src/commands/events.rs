use clap::Subcommand;
use organisely_core::models::{BroadcastEventRequest, TrackEventRequest};
use serde_json::Value;

use super::{CmdResult, Context};

#[derive(Subcommand)]
pub enum EventAction {
    /// Track an event for a user
    Track {
        /// Event type (e.g. "habit.completed")
        event_type: String,
        /// Event data as a JSON object
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Broadcast an event to other users
    Broadcast {
        event_type: String,
        #[arg(long)]
        data: Option<String>,
        /// Target user id; repeat for several
        #[arg(long = "to")]
        targets: Vec<String>,
    },
}

fn parse_data(data: Option<String>) -> Result<Option<Value>, serde_json::Error> {
    data.map(|raw| serde_json::from_str(&raw)).transpose()
}

pub async fn run(ctx: &Context, action: EventAction) -> CmdResult {
    let client = ctx.client()?;
    match action {
        EventAction::Track {
            event_type,
            data,
            user,
        } => {
            let mut request = TrackEventRequest::new(event_type);
            request.event_data = parse_data(data)?;
            client.track_event(&request, user.as_deref()).await?;
            println!("tracked {}", request.event_type);
        }
        EventAction::Broadcast {
            event_type,
            data,
            targets,
        } => {
            let request = BroadcastEventRequest {
                event_type,
                event_data: parse_data(data)?,
                target_users: (!targets.is_empty()).then_some(targets),
                ..BroadcastEventRequest::default()
            };
            client.broadcast_event(&request).await?;
            println!("broadcast {}", request.event_type);
        }
    }
    Ok(())
}
