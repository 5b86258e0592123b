//! Asset portal access tool.
//!
//! Usage:
//!   asset-portal-access login <token>
//!   asset-portal-access token --header
//!   asset-portal-access check --group portal-editors
//!   asset-portal-access groups
//!   asset-portal-access logout

mod cli;
mod config;

use asset_portal_platform_access::{
    AccessGuard, BEARER_TOKEN_KEY, CredentialOutcome, FileTokenStore, ImsClient, ProviderSession,
    StaticProviderLoader, TokenStore,
};
use clap::Parser;
use cli::{Cli, Commands};
use crate::config::AccessConfig;
use rootcause::prelude::Report;
use std::fmt;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Errors surfaced by the command-line front end.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CommandError {
    Configuration { reason: String },
    Setup,
    Credential,
    AccessCheck,
    Profile,
    TokenStore,
    Output { reason: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => write!(f, "invalid configuration: {reason}"),
            Self::Setup => write!(f, "failed to set up the identity service client"),
            Self::Credential => write!(f, "could not obtain a bearer token"),
            Self::AccessCheck => write!(f, "access check failed"),
            Self::Profile => write!(f, "could not fetch the user profile"),
            Self::TokenStore => write!(f, "token store error"),
            Self::Output { reason } => write!(f, "failed to render output: {reason}"),
        }
    }
}

impl std::error::Error for CommandError {}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(report) => {
            eprintln!("error: {report}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Report<CommandError>> {
    let mut config = AccessConfig::from_env().map_err(|e| CommandError::Configuration {
        reason: e.to_string(),
    })?;
    if let Some(path) = cli.token_store {
        config.token_store_path = path;
    }
    tracing::debug!(token_store = %config.token_store_path.display(), "Loaded configuration");

    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token_store_path.clone()));

    match cli.command {
        Commands::Login { token } => {
            store
                .set(BEARER_TOKEN_KEY, &token)
                .await
                .map_err(|report| report.context(CommandError::TokenStore))?;
            tracing::info!("Cached bearer token");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Logout => {
            store
                .remove(BEARER_TOKEN_KEY)
                .await
                .map_err(|report| report.context(CommandError::TokenStore))?;
            tracing::info!("Removed cached bearer token");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Token { header } => {
            let guard = build_guard(config, store)?;
            match guard
                .acquire_credential()
                .await
                .map_err(|report| report.context(CommandError::Credential))?
            {
                CredentialOutcome::Resolved(credential) => {
                    if header {
                        println!("{}", credential.header_value());
                    } else {
                        println!("{}", credential.token());
                    }
                    Ok(ExitCode::SUCCESS)
                }
                CredentialOutcome::ReauthenticationStarted => {
                    eprintln!("not signed in; sign in and try again");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Check { group } => {
            let guard = build_guard(config, store)?;
            let group = group.unwrap_or_else(|| guard.config().user_group().to_string());
            let allowed = guard
                .is_user_in_security_group(&group)
                .await
                .map_err(|report| report.context(CommandError::AccessCheck))?;
            if allowed {
                println!("allowed: member of {group}");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("denied: not a member of {group}");
                Ok(ExitCode::from(2))
            }
        }
        Commands::Groups => {
            let guard = build_guard(config, store)?;
            let groups = guard
                .security_group_memberships()
                .await
                .map_err(|report| report.context(CommandError::AccessCheck))?;
            for group in groups {
                println!("{}", group.group_name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Profile => {
            let guard = build_guard(config, store)?;
            let profile = guard
                .user_profile()
                .await
                .map_err(|report| report.context(CommandError::Profile))?;
            let rendered =
                serde_json::to_string_pretty(&profile).map_err(|e| CommandError::Output {
                    reason: e.to_string(),
                })?;
            println!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_guard(
    config: AccessConfig,
    store: Arc<dyn TokenStore>,
) -> Result<AccessGuard, Report<CommandError>> {
    let client = ImsClient::new(&config.ims).map_err(|report| report.context(CommandError::Setup))?;
    let loader = StaticProviderLoader::new(config.access_token, client.clone());

    Ok(AccessGuard::new(
        config.ims,
        Arc::new(ProviderSession::new()),
        store,
        Arc::new(loader),
        client,
    ))
}
