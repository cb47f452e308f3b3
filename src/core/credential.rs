//! Credential resolution.
//!
//! The workflow never knows where credentials live. A
//! [`CredentialProvider`] is injected when the client is built and maps a
//! credential id to a username and secret.

use std::fmt;

use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// API key and secret for one service account.
#[derive(Clone)]
pub struct Credential {
    username: String,
    secret: Zeroizing<String>,
}

impl Credential {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: Zeroizing::new(secret.into()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Resolves a credential id to a [`Credential`].
pub trait CredentialProvider {
    /// # Errors
    ///
    /// Returns `ConfigError::CredentialNotFound` if the id is unknown.
    fn resolve(&self, id: &str) -> Result<Credential>;
}

impl<F> CredentialProvider for F
where
    F: Fn(&str) -> Result<Credential>,
{
    fn resolve(&self, id: &str) -> Result<Credential> {
        self(id)
    }
}

/// Credentials read from environment variables.
///
/// Id `default` reads `COURIER_API_KEY` and `COURIER_API_SECRET`. Any other
/// id `x` reads `COURIER_X_API_KEY` and `COURIER_X_API_SECRET`, with the id
/// upper-cased and `-` or `.` replaced by `_`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl EnvCredentials {
    /// Names of the key and secret variables for `id`.
    pub fn var_names(id: &str) -> (String, String) {
        if id == constants::DEFAULT_CREDENTIAL {
            return (
                format!("{}_API_KEY", constants::ENV_PREFIX),
                format!("{}_API_SECRET", constants::ENV_PREFIX),
            );
        }
        let slug: String = id
            .chars()
            .map(|c| match c {
                '-' | '.' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        (
            format!("{}_{}_API_KEY", constants::ENV_PREFIX, slug),
            format!("{}_{}_API_SECRET", constants::ENV_PREFIX, slug),
        )
    }
}

impl CredentialProvider for EnvCredentials {
    fn resolve(&self, id: &str) -> Result<Credential> {
        let (key_var, secret_var) = Self::var_names(id);
        debug!(id, key_var = %key_var, "resolving credential from environment");

        let lookup = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::CredentialNotFound(id.to_string()))
        };

        Ok(Credential::new(lookup(&key_var)?, lookup(&secret_var)?))
    }
}
