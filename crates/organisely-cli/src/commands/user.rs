use clap::Subcommand;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum UserAction {
    /// Profile of the authenticated user
    Me,
    /// Fetch a user by id
    Get { id: String },
}

pub async fn run(ctx: &Context, action: UserAction) -> CmdResult {
    let client = ctx.client()?;
    let response = match action {
        UserAction::Me => client.get_current_user().await?,
        UserAction::Get { id } => client.get_user(&id).await?,
    };
    print_json(&response.data)
}
