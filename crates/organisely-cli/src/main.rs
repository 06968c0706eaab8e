use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "organisely-cli", version, about = "Organisely CLI")]
struct Cli {
    /// Config file to use instead of ~/.config/organisely/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log request attempts and retries to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// User profiles
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Habit tracking
    Habits {
        #[command(subcommand)]
        action: commands::habits::HabitAction,
    },
    /// Email
    Emails {
        #[command(subcommand)]
        action: commands::emails::EmailAction,
    },
    /// Calendar events
    Calendar {
        #[command(subcommand)]
        action: commands::calendar::CalendarAction,
    },
    /// Event tracking
    Events {
        #[command(subcommand)]
        action: commands::events::EventAction,
    },
    /// Integration registry and dependency resolution
    Integrations {
        #[command(subcommand)]
        action: commands::integrations::IntegrationAction,
    },
    /// OAuth2 helpers
    Oauth {
        #[command(subcommand)]
        action: commands::oauth::OAuthAction,
    },
    /// Run a webhook payload through the bot
    Webhook {
        #[command(subcommand)]
        action: commands::webhook::WebhookAction,
    },
    /// API health check
    Health,
    /// API version
    Version,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = commands::Context::new(cli.config);
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(&ctx, action),
        Commands::User { action } => commands::user::run(&ctx, action).await,
        Commands::Habits { action } => commands::habits::run(&ctx, action).await,
        Commands::Emails { action } => commands::emails::run(&ctx, action).await,
        Commands::Calendar { action } => commands::calendar::run(&ctx, action).await,
        Commands::Events { action } => commands::events::run(&ctx, action).await,
        Commands::Integrations { action } => commands::integrations::run(&ctx, action).await,
        Commands::Oauth { action } => commands::oauth::run(action).await,
        Commands::Webhook { action } => commands::webhook::run(action).await,
        Commands::Health => commands::utility::health(&ctx).await,
        Commands::Version => commands::utility::version(&ctx).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
