//! Package types.
//!
//! A package is the remote container a run uploads into. It is identified
//! by its id and unlocked by a key code that never leaves the client.

use std::fmt;

use zeroize::Zeroizing;

use crate::core::types::{EmailAddress, FileId, PackageId};

/// Secret that rejoins the encryption session of a package.
///
/// Zeroized on drop and redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyCode(Zeroizing<String>);

impl KeyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(Zeroizing::new(code.into()))
    }

    /// The raw key code.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyCode(<redacted>)")
    }
}

/// A package created for one run.
#[derive(Debug, Clone)]
pub struct Package {
    id: PackageId,
    key_code: KeyCode,
}

impl Package {
    pub fn new(id: impl Into<PackageId>, key_code: KeyCode) -> Self {
        Self {
            id: id.into(),
            key_code,
        }
    }

    /// Package identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Key code for every operation on this package
    pub fn key_code(&self) -> &KeyCode {
        &self.key_code
    }
}

/// A file accepted by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_id: FileId,
    pub file_name: String,
}

impl fmt::Display for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.file_name, self.file_id)
    }
}

/// Retrieval link produced by a successful finalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUrl {
    /// Link recipients open to download the package
    pub url: String,
    /// Recipients the service notified, empty when notification was off
    pub notified: Vec<EmailAddress>,
    /// Free-form confirmation returned by the service
    pub message: Option<String>,
}

impl fmt::Display for PackageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
