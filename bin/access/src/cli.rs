//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "asset-portal-access")]
#[command(version)]
#[command(about = "Acquire IMS credentials and check asset portal access", long_about = None)]
pub struct Cli {
    /// Token store file (overrides ASSET_PORTAL__TOKEN_STORE_PATH)
    #[arg(long, global = true)]
    pub token_store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a bearer token
    Token {
        /// Print the full Authorization header value
        #[arg(long)]
        header: bool,
    },

    /// Check membership in the access group; exits non-zero when denied
    Check {
        /// Group to check instead of the configured one
        #[arg(long)]
        group: Option<String>,
    },

    /// List the groups held in the configured organization
    Groups,

    /// Print the signed-in user's profile as JSON
    Profile,

    /// Cache a bearer token for later commands
    Login {
        /// The token to cache
        token: String,
    },

    /// Remove the cached bearer token
    Logout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_with_group() {
        let cli = Cli::parse_from(["asset-portal-access", "check", "--group", "editors"]);
        match cli.command {
            Commands::Check { group } => assert_eq!(group.as_deref(), Some("editors")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_token_store_after_subcommand() {
        let cli = Cli::parse_from([
            "asset-portal-access",
            "logout",
            "--token-store",
            "/tmp/t.json",
        ]);
        assert_eq!(cli.token_store, Some(PathBuf::from("/tmp/t.json")));
    }
}
