use clap::Subcommand;
use organisely_core::models::SendEmailRequest;

use super::habits::PageArgs;
use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum EmailAction {
    /// List emails
    List(PageArgs),
    /// Show one email
    Get { id: String },
    /// Send an email
    Send {
        /// Recipient address; repeat for several
        #[arg(long, required = true)]
        to: Vec<String>,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        user: Option<String>,
    },
}

pub async fn run(ctx: &Context, action: EmailAction) -> CmdResult {
    let client = ctx.client()?;
    match action {
        EmailAction::List(page) => {
            let response = client.get_emails(page.user.as_deref(), &page.params()).await?;
            print_json(&response.data)
        }
        EmailAction::Get { id } => print_json(&client.get_email(&id).await?.data),
        EmailAction::Send {
            to,
            subject,
            body,
            user,
        } => {
            let request = SendEmailRequest::new(to, subject, body);
            let response = client.send_email(&request, user.as_deref()).await?;
            print_json(&response.data)
        }
    }
}
