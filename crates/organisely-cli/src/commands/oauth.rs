use clap::{Args, Subcommand};
use organisely_core::constants::OAUTH_BASE_URL;
use organisely_core::{OAuthClient, OAuthConfig, TokenTypeHint};

use super::{print_json, CmdResult};

#[derive(Args)]
pub struct AppArgs {
    #[arg(long)]
    client_id: String,
    #[arg(long, default_value = "")]
    client_secret: String,
    #[arg(long)]
    redirect_uri: String,
    /// Scope to request; repeat for several
    #[arg(long = "scope")]
    scopes: Vec<String>,
    /// Provider base URL holding /authorize and /token
    #[arg(long, default_value = OAUTH_BASE_URL)]
    provider: String,
}

impl AppArgs {
    fn client(self) -> OAuthClient {
        let provider = self.provider.trim_end_matches('/');
        OAuthClient::new(OAuthConfig {
            client_id: self.client_id,
            client_secret: self.client_secret,
            redirect_uri: self.redirect_uri,
            auth_url: format!("{provider}/authorize"),
            token_url: format!("{provider}/token"),
            scopes: self.scopes,
        })
    }
}

#[derive(Subcommand)]
pub enum OAuthAction {
    /// Print the authorization URL
    Url {
        #[command(flatten)]
        app: AppArgs,
        #[arg(long)]
        state: Option<String>,
    },
    /// Exchange an authorization code for tokens
    Exchange {
        #[command(flatten)]
        app: AppArgs,
        #[arg(long)]
        code: String,
    },
    /// Refresh an access token
    Refresh {
        #[command(flatten)]
        app: AppArgs,
        #[arg(long)]
        refresh_token: String,
    },
    /// Revoke a token
    Revoke {
        #[command(flatten)]
        app: AppArgs,
        #[arg(long)]
        token: String,
        /// Treat the token as a refresh token
        #[arg(long)]
        refresh: bool,
    },
}

pub async fn run(action: OAuthAction) -> CmdResult {
    match action {
        OAuthAction::Url { app, state } => {
            println!("{}", app.client().authorization_url(state.as_deref()));
            Ok(())
        }
        OAuthAction::Exchange { app, code } => {
            print_json(&app.client().exchange_code(&code).await)
        }
        OAuthAction::Refresh { app, refresh_token } => {
            print_json(&app.client().refresh_token(&refresh_token).await)
        }
        OAuthAction::Revoke {
            app,
            token,
            refresh,
        } => {
            let hint = if refresh {
                TokenTypeHint::RefreshToken
            } else {
                TokenTypeHint::AccessToken
            };
            print_json(&app.client().revoke_token(&token, hint).await)
        }
    }
}
