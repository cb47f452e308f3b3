//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// Opaque package identifier assigned by the service.
pub type PackageId = String;

/// Opaque file identifier assigned by the service.
pub type FileId = String;

/// An email address registered as a package recipient.
pub type EmailAddress = String;
