//! Stockade - an envelope-encrypted credential store on DynamoDB and KMS.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stockade::cli::{execute, output, Cli};
use stockade::error::Error;

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr so `stockade get` stays pipe-friendly.
    let filter = EnvFilter::try_from_env("STOCKADE_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("stockade=debug")
        } else {
            EnvFilter::new("stockade=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::SecretNotFound => Some("check stored names with: stockade list"),
            Error::DuplicateVersion { .. } => {
                Some("another writer took this version; retry without an explicit version")
            }
            Error::Timeout => Some("the table may still be creating; check its status and retry"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
