//! Check command.
//!
//! Resolves configuration and credentials exactly as `send` would, then
//! prints the effective settings. Never contacts the service.

use tracing::info;

use crate::cli::output;
use crate::cli::SourceArgs;
use crate::core::config::Options;
use crate::core::constants;
use crate::core::credential::EnvCredentials;
use crate::core::enumerate::Selection;
use crate::error::Result;

/// Validate configuration and print the effective settings.
pub fn execute(source: &SourceArgs) -> Result<()> {
    let options = source.options(Options::default())?;
    let config = options.to_workflow(&EnvCredentials)?;
    Selection::new(options.include.as_deref(), options.exclude.as_deref())?;
    info!(credential = options.credential_id(), "configuration resolved");

    output::section("Configuration");
    output::kv("endpoint", config.endpoint());
    output::kv(
        "credential",
        format!("{} ({})", options.credential_id(), config.credential().username()),
    );
    output::kv(
        "include",
        options.include.as_deref().unwrap_or(constants::DEFAULT_INCLUDE),
    );
    output::kv("exclude", options.exclude.as_deref().unwrap_or("-"));
    match config.life_days() {
        Some(days) => output::kv("life", format!("{} day(s)", days)),
        None => output::kv("life", "service default"),
    }
    output::kv("notify", config.notify());
    output::kv("message", if config.message().is_some() { "set" } else { "-" });

    if config.recipients().is_empty() {
        output::kv("recipients", "none");
    } else {
        output::kv("recipients", config.recipients().len());
        for email in config.recipients() {
            output::list_item(email);
        }
    }

    println!();
    output::success("configuration is valid");
    Ok(())
}
