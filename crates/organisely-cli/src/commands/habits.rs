use clap::{Args, Subcommand, ValueEnum};
use organisely_core::models::{CreateHabitRequest, HabitFrequency, PaginationParams};

use super::{print_json, CmdResult, Context};

#[derive(Args)]
pub struct PageArgs {
    /// Acting user (defaults to the configured user_id)
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub cursor: Option<String>,
}

impl PageArgs {
    pub fn params(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
            cursor: self.cursor.clone(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<FrequencyArg> for HabitFrequency {
    fn from(value: FrequencyArg) -> Self {
        match value {
            FrequencyArg::Daily => HabitFrequency::Daily,
            FrequencyArg::Weekly => HabitFrequency::Weekly,
            FrequencyArg::Monthly => HabitFrequency::Monthly,
        }
    }
}

#[derive(Subcommand)]
pub enum HabitAction {
    /// List habits
    List(PageArgs),
    /// Show one habit
    Get { id: String },
    /// Create a habit
    Create {
        name: String,
        #[arg(long, value_enum, default_value = "daily")]
        frequency: FrequencyArg,
        #[arg(long, default_value_t = 1)]
        target: u32,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Record a completion
    Complete {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a habit
    Delete { id: String },
}

pub async fn run(ctx: &Context, action: HabitAction) -> CmdResult {
    let client = ctx.client()?;
    match action {
        HabitAction::List(page) => {
            let response = client.get_habits(page.user.as_deref(), &page.params()).await?;
            print_json(&response.data)
        }
        HabitAction::Get { id } => print_json(&client.get_habit(&id).await?.data),
        HabitAction::Create {
            name,
            frequency,
            target,
            description,
            user,
        } => {
            let mut request = CreateHabitRequest::new(name, frequency.into(), target);
            request.description = description;
            let response = client.create_habit(&request, user.as_deref()).await?;
            print_json(&response.data)
        }
        HabitAction::Complete { id, notes } => {
            client.complete_habit(&id, notes.as_deref()).await?;
            println!("completed {id}");
            Ok(())
        }
        HabitAction::Delete { id } => {
            client.delete_habit(&id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}
