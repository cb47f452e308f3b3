//! Error types for courier.
//!
//! Each layer has its own error enum; [`Error`] wraps them so the whole
//! crate shares one `Result` alias. Remote failures are tagged per
//! package operation so callers can tell which step of a run failed.

use std::fmt;
use std::io;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Cancellation observed during, or right before, the tagged operation.
    #[error("{0} cancelled")]
    Cancelled(FailureKind),
}

/// Configuration and credential errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("credential '{0}' not found")]
    CredentialNotFound(String),
}

/// File enumeration and storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no files were found")]
    NoFiles,

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("cannot access {path}: {source}")]
    Access {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Failures reported by the remote package service, one per operation.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("failed to create package: {0}")]
    CreatePackage(String),

    #[error("failed to upload file: {0}")]
    UploadFile(String),

    #[error("package limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("failed to attach message: {0}")]
    Message(String),

    #[error("failed to update package life: {0}")]
    UpdatePackageLife(String),

    #[error("failed to add recipient: {0}")]
    Recipient(String),

    #[error("failed to finalize package: {0}")]
    FinalizePackage(String),

    #[error("package requires approval before release: {0}")]
    ApproverRequired(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Coarse failure category of an [`Error`], used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NoFiles,
    Config,
    CreatePackage,
    Upload,
    Message,
    Lifetime,
    Recipient,
    Finalize,
    ApprovalRequired,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::NoFiles => "no-files",
            FailureKind::Config => "config",
            FailureKind::CreatePackage => "create-package",
            FailureKind::Upload => "upload",
            FailureKind::Message => "message",
            FailureKind::Lifetime => "lifetime",
            FailureKind::Recipient => "recipient",
            FailureKind::Finalize => "finalize",
            FailureKind::ApprovalRequired => "approval-required",
            FailureKind::Io => "io",
        };
        f.write_str(label)
    }
}

impl Error {
    /// Failure category for this error.
    ///
    /// A cancelled operation is reported in that operation's category, the
    /// same as an I/O failure inside it. Use [`Error::is_cancelled`] to tell
    /// the two apart.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Config(_) => FailureKind::Config,
            Error::Cancelled(kind) => *kind,
            Error::Storage(StorageError::NoFiles) => FailureKind::NoFiles,
            Error::Storage(_) | Error::Io(_) => FailureKind::Io,
            Error::Remote(e) => match e {
                RemoteError::CreatePackage(_) => FailureKind::CreatePackage,
                RemoteError::UploadFile(_) | RemoteError::LimitExceeded(_) => FailureKind::Upload,
                RemoteError::Message(_) => FailureKind::Message,
                RemoteError::UpdatePackageLife(_) => FailureKind::Lifetime,
                RemoteError::Recipient(_) => FailureKind::Recipient,
                RemoteError::FinalizePackage(_) => FailureKind::Finalize,
                RemoteError::ApproverRequired(_) => FailureKind::ApprovalRequired,
                RemoteError::Transport(_) => FailureKind::Io,
            },
        }
    }

    /// Whether this error came from an observed cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled(_) => true,
            Error::Io(e) => crate::core::cancel::is_cancellation(e),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
