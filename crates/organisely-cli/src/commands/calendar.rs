use clap::Subcommand;
use organisely_core::models::CreateEventRequest;

use super::habits::PageArgs;
use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum CalendarAction {
    /// List calendar events
    List(PageArgs),
    /// Show one event
    Get { id: String },
    /// Create an event
    Create {
        title: String,
        /// RFC 3339 start time
        #[arg(long)]
        start: String,
        /// RFC 3339 end time
        #[arg(long)]
        end: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Delete an event
    Delete { id: String },
}

pub async fn run(ctx: &Context, action: CalendarAction) -> CmdResult {
    let client = ctx.client()?;
    match action {
        CalendarAction::List(page) => {
            let response = client
                .get_calendar_events(page.user.as_deref(), &page.params())
                .await?;
            print_json(&response.data)
        }
        CalendarAction::Get { id } => print_json(&client.get_calendar_event(&id).await?.data),
        CalendarAction::Create {
            title,
            start,
            end,
            location,
            user,
        } => {
            let mut request = CreateEventRequest::new(title, start, end);
            request.location = location;
            let response = client
                .create_calendar_event(&request, user.as_deref())
                .await?;
            print_json(&response.data)
        }
        CalendarAction::Delete { id } => {
            client.delete_calendar_event(&id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}
