//! Command-line interface.

pub mod check;
pub mod output;
pub mod send;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::config::{FileConfig, Options};
use crate::error::Result;

/// Courier - Encrypted package delivery from the command line.
#[derive(Parser)]
#[command(
    name = "courier",
    about = "Encrypt files into a package and hand out the link",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Upload files into a new package and finalize it
    Send(SendArgs),

    /// Validate configuration and credentials without contacting the service
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Where settings and credentials come from.
#[derive(Args, Debug, Default, Clone)]
pub struct SourceArgs {
    /// Configuration file (default: ./courier.toml, then the user config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Service host URL
    #[arg(long, env = "COURIER_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Credential id resolved from the environment
    #[arg(long, value_name = "ID")]
    pub credential: Option<String>,
}

/// Arguments of `courier send`.
#[derive(Args, Debug, Default, Clone)]
pub struct SendArgs {
    /// Files or directories to send (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Comma-separated globs selecting files inside directories
    #[arg(long, value_name = "GLOBS")]
    pub include: Option<String>,

    /// Comma-separated globs excluding files inside directories
    #[arg(long, value_name = "GLOBS")]
    pub exclude: Option<String>,

    /// Comma-separated recipient addresses
    #[arg(short, long, value_name = "LIST")]
    pub recipients: Option<String>,

    /// Message attached to the package
    #[arg(short, long)]
    pub message: Option<String>,

    /// Package lifetime in days
    #[arg(long, value_name = "DAYS")]
    pub life: Option<u32>,

    /// Do not email recipients when the package is finalized
    #[arg(long)]
    pub no_notify: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

impl SourceArgs {
    /// Load the configuration file and apply the flags on top.
    pub fn options(&self, overrides: Options) -> Result<Options> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::discover()?,
        };

        let flags = Options {
            endpoint: self.endpoint.clone(),
            credential: self.credential.clone(),
            ..overrides
        };
        Ok(file.courier.merge(flags))
    }
}

impl SendArgs {
    fn overrides(&self) -> Options {
        Options {
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            life: self.life,
            notify: self.no_notify.then_some(false),
            recipients: self.recipients.clone(),
            message: self.message.clone(),
            ..Options::default()
        }
    }

    /// Effective options for this invocation.
    pub fn options(&self) -> Result<Options> {
        self.source.options(self.overrides())
    }
}

/// Execute a command.
pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Send(args) => send::execute(&args),
        Command::Check { source } => check::execute(&source),
    }
}
