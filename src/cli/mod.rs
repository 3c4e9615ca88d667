//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::error::Result;

/// Stockade - an envelope-encrypted credential store on DynamoDB and KMS.
#[derive(Parser)]
#[command(
    name = "stockade",
    about = "An envelope-encrypted credential store on DynamoDB and KMS",
    version
)]
pub struct Cli {
    /// DynamoDB table that stores credentials
    #[arg(
        short = 't',
        long,
        global = true,
        env = "STOCKADE_TABLE",
        default_value = crate::core::constants::DEFAULT_TABLE
    )]
    pub table: String,

    /// KMS key alias used to generate data keys
    #[arg(
        short = 'k',
        long,
        global = true,
        env = "STOCKADE_ALIAS",
        default_value = crate::core::constants::DEFAULT_KMS_ALIAS
    )]
    pub alias: String,

    /// AWS region override
    #[arg(short = 'r', long, global = true)]
    pub region: Option<String>,

    /// Render listings as CSV instead of an aligned table
    #[arg(short = 'c', long, global = true)]
    pub csv: bool,

    /// Render listings as JSON instead of an aligned table
    #[arg(short = 'j', long, global = true, conflicts_with = "csv")]
    pub json: bool,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create the DynamoDB table used to store credentials
    Setup,

    /// Get a credential from the store
    Get {
        /// Name of the credential
        name: String,
        /// Exact version to fetch (defaults to the highest)
        version: Option<String>,
    },

    /// Put a credential into the store
    Put {
        /// Name of the credential
        name: String,
        /// Secret value to store
        value: String,
        /// Version to store (defaults to highest + 1)
        version: Option<u64>,
    },

    /// Put a credential from a file into the store
    PutFile {
        /// Name of the credential
        name: String,
        /// Path to a file holding the secret value
        path: String,
        /// Version to store (defaults to highest + 1)
        version: Option<u64>,
    },

    /// List credential names with versions and creation dates
    List {
        /// List every version, not just the latest per name
        #[arg(long)]
        all: bool,
    },

    /// Get and decrypt every credential in the store
    Getall {
        /// List every version, not just the latest per name
        #[arg(long)]
        all: bool,
    },

    /// Delete every version of a credential
    Delete {
        /// Name of the credential
        name: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Execute a parsed command.
pub fn execute(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Setup => commands::setup(&cli),
        Command::Get { name, version } => commands::get(&cli, name, version.as_deref()),
        Command::Put {
            name,
            value,
            version,
        } => commands::put(&cli, name, value, version.unwrap_or(0)),
        Command::PutFile {
            name,
            path,
            version,
        } => commands::put_file(&cli, name, path, version.unwrap_or(0)),
        Command::List { all } => commands::list(&cli, *all),
        Command::Getall { all } => commands::get_all(&cli, *all),
        Command::Delete { name } => commands::delete(&cli, name),
        Command::Completions { shell } => commands::completions(*shell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["stockade", "list"]).unwrap();
        assert_eq!(cli.table, "credential-store");
        assert_eq!(cli.alias, "alias/stockade");
        assert!(!cli.csv);
        assert!(!cli.json);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["stockade", "list", "--all", "--table", "other", "--csv"]).unwrap();
        assert_eq!(cli.table, "other");
        assert!(cli.csv);
        assert!(matches!(cli.command, Command::List { all: true }));
    }

    #[test]
    fn test_json_flag_conflicts_with_csv() {
        let cli = Cli::try_parse_from(["stockade", "list", "--json"]).unwrap();
        assert!(cli.json);
        assert!(Cli::try_parse_from(["stockade", "list", "--json", "--csv"]).is_err());
    }

    #[test]
    fn test_put_parses_optional_version() {
        let cli = Cli::try_parse_from(["stockade", "put", "db/password", "s3cr3t", "7"]).unwrap();
        match cli.command {
            Command::Put { name, value, version } => {
                assert_eq!(name, "db/password");
                assert_eq!(value, "s3cr3t");
                assert_eq!(version, Some(7));
            }
            _ => panic!("expected put"),
        }
    }

    #[test]
    fn test_put_rejects_non_numeric_version() {
        assert!(Cli::try_parse_from(["stockade", "put", "name", "value", "eleven"]).is_err());
    }
}
