//! Configuration management.
//!
//! Two layers: [`FileConfig`] is the optional `courier.toml` file as
//! written by users, and [`WorkflowConfig`] is the validated, immutable
//! value a single run is driven by.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::core::credential::{Credential, CredentialProvider};
use crate::core::domain::parse_recipients;
use crate::core::types::EmailAddress;
use crate::error::{ConfigError, Result};

/// Contents of `courier.toml`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub courier: Options,
}

/// Options recognized in the `[courier]` table. All are optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Service host URL
    pub endpoint: Option<String>,
    /// Credential id handed to the credential provider
    pub credential: Option<String>,
    /// Comma-separated glob patterns selecting files
    pub include: Option<String>,
    /// Comma-separated glob patterns excluding files
    pub exclude: Option<String>,
    /// Package lifetime in days
    pub life: Option<u32>,
    /// Notify recipients on finalize
    pub notify: Option<bool>,
    /// Comma-separated recipient addresses
    pub recipients: Option<String>,
    /// Message attached to the package
    pub message: Option<String>,
}

impl Options {
    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: Options) -> Options {
        Options {
            endpoint: other.endpoint.or(self.endpoint),
            credential: other.credential.or(self.credential),
            include: other.include.or(self.include),
            exclude: other.exclude.or(self.exclude),
            life: other.life.or(self.life),
            notify: other.notify.or(self.notify),
            recipients: other.recipients.or(self.recipients),
            message: other.message.or(self.message),
        }
    }

    pub fn credential_id(&self) -> &str {
        self.credential
            .as_deref()
            .unwrap_or(constants::DEFAULT_CREDENTIAL)
    }

    /// Resolve the credential and build a validated [`WorkflowConfig`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the credential cannot be resolved or a
    /// value is invalid.
    pub fn to_workflow(&self, provider: &dyn CredentialProvider) -> Result<WorkflowConfig> {
        let credential = provider.resolve(self.credential_id())?;

        let mut builder = WorkflowConfig::builder(credential)
            .life(self.life)
            .notify(self.notify.unwrap_or(true));
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint);
        }
        if let Some(recipients) = &self.recipients {
            builder = builder.recipients(recipients);
        }
        if let Some(message) = &self.message {
            builder = builder.message(message);
        }
        builder.build()
    }
}

impl FileConfig {
    /// Path of the configuration file in the current directory
    pub fn local_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Path of the per-user configuration file, if a config dir exists.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("courier").join(constants::CONFIG_FILE))
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` if the file cannot be read, or
    /// `ConfigError::Parse` if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Load `courier.toml` from the current directory, then the user config
    /// directory. Missing files yield the defaults.
    pub fn discover() -> Result<Self> {
        let candidates = std::iter::once(Self::local_path()).chain(Self::user_path());
        for path in candidates {
            if path.exists() {
                return Self::load(&path);
            }
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }
}

/// Immutable settings for one run.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    endpoint: String,
    credential: Credential,
    recipients: Vec<EmailAddress>,
    message: Option<String>,
    life_days: Option<u32>,
    notify: bool,
}

impl WorkflowConfig {
    pub fn builder(credential: Credential) -> WorkflowConfigBuilder {
        WorkflowConfigBuilder {
            endpoint: constants::DEFAULT_ENDPOINT.to_string(),
            credential,
            recipients: None,
            message: None,
            life_days: None,
            notify: true,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Recipients in configured order, already split and trimmed.
    pub fn recipients(&self) -> &[EmailAddress] {
        &self.recipients
    }

    /// Message to attach; never empty when present.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Package lifetime in days; never zero when present.
    pub fn life_days(&self) -> Option<u32> {
        self.life_days
    }

    pub fn notify(&self) -> bool {
        self.notify
    }
}

/// Builder for [`WorkflowConfig`]; validation happens in [`build`](Self::build).
#[derive(Debug)]
pub struct WorkflowConfigBuilder {
    endpoint: String,
    credential: Credential,
    recipients: Option<String>,
    message: Option<String>,
    life_days: Option<u32>,
    notify: bool,
}

impl WorkflowConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Comma-separated recipient list.
    pub fn recipients(mut self, recipients: impl Into<String>) -> Self {
        self.recipients = Some(recipients.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn life(mut self, days: Option<u32>) -> Self {
        self.life_days = days;
        self
    }

    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the endpoint is not an
    /// http(s) URL or the lifetime is zero.
    pub fn build(self) -> Result<WorkflowConfig> {
        let endpoint = self.endpoint.trim().to_string();
        let url = reqwest::Url::parse(&endpoint).map_err(|e| ConfigError::InvalidValue {
            field: "endpoint",
            reason: format!("{}: {}", endpoint, e),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "endpoint",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }
            .into());
        }

        if self.life_days == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "life",
                reason: "must be a positive number of days".to_string(),
            }
            .into());
        }

        Ok(WorkflowConfig {
            endpoint,
            credential: self.credential,
            recipients: self
                .recipients
                .as_deref()
                .map(parse_recipients)
                .unwrap_or_default(),
            message: self.message.filter(|m| !m.trim().is_empty()),
            life_days: self.life_days,
            notify: self.notify,
        })
    }
}
