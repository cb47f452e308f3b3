//! Constants used throughout courier.
//!
//! Centralizes magic strings and configuration values.

/// Configuration file name (courier.toml).
pub const CONFIG_FILE: &str = "courier.toml";

/// Service host used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://app.sendsafely.com";

/// Credential id used when none is configured.
pub const DEFAULT_CREDENTIAL: &str = "default";

/// Include pattern used when a directory is searched without one.
pub const DEFAULT_INCLUDE: &str = "**/*";

/// Prefix for credential environment variables.
pub const ENV_PREFIX: &str = "COURIER";

/// Log filter environment variable.
pub const LOG_ENV: &str = "COURIER_LOG";

/// REST API base path on the service host.
pub const API_BASE: &str = "/api/v2.0";

/// Prefix and suffix for temporary ciphertext items.
pub const TEMP_PREFIX: &str = "courier-";
pub const TEMP_SUFFIX: &str = ".age";
