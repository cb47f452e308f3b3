//! Courier - Encrypted package delivery from the command line.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use courier::cli::output;
use courier::cli::{execute, Cli};
use courier::core::constants;
use courier::core::credential::EnvCredentials;
use courier::error::{ConfigError, Error, RemoteError, StorageError};

/// Suggestion shown below an error, if one applies.
fn hint_for(err: &Error) -> Option<String> {
    match err {
        Error::Config(ConfigError::CredentialNotFound(id)) => {
            let (key, secret) = EnvCredentials::var_names(id);
            Some(format!("set {} and {}", key, secret))
        }
        Error::Storage(StorageError::NoFiles) => {
            Some("check the paths and the --include/--exclude patterns".to_string())
        }
        Error::Remote(RemoteError::ApproverRequired(_)) => {
            Some("an approver must release the package before recipients can open it".to_string())
        }
        Error::Remote(RemoteError::LimitExceeded(_)) => {
            Some("the account's package quota is used up".to_string())
        }
        _ => None,
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(constants::LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("courier=debug")
        } else {
            EnvFilter::new("courier=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .init();

    if let Err(e) = execute(cli.command) {
        output::error(&e.to_string());
        if let Some(hint) = hint_for(&e) {
            output::hint(&hint);
        }
        std::process::exit(1);
    }
}
