//! Remote package service.
//!
//! [`PackageClient`] is the set of package lifecycle operations a run
//! drives. Each call blocks until the service answers. [`HttpClient`] talks
//! to the real service; tests substitute their own implementation.
//!
//! ## Operations
//!
//! | Operation | Failure |
//! |-----------|---------|
//! | `create_package` | `RemoteError::CreatePackage` |
//! | `encrypt_and_upload_file` | `RemoteError::UploadFile`, `RemoteError::LimitExceeded` |
//! | `encrypt_and_upload_message` | `RemoteError::Message` |
//! | `update_package_life` | `RemoteError::UpdatePackageLife` |
//! | `add_recipient` | `RemoteError::Recipient` |
//! | `finalize_package` | `RemoteError::FinalizePackage`, `RemoteError::ApproverRequired` |

use crate::core::domain::{KeyCode, Package, PackageUrl, UploadedFile};
use crate::core::storage::StorageItem;
use crate::error::Result;

mod http;
pub mod seal;

pub use http::HttpClient;

/// Package lifecycle operations against one authenticated session.
pub trait PackageClient {
    /// Allocate a new package and its key code.
    fn create_package(&self) -> Result<Package>;

    /// Encrypt `item` client-side and upload it into the package.
    ///
    /// I/O failures on the item are reported as `RemoteError::UploadFile`.
    fn encrypt_and_upload_file(
        &self,
        package_id: &str,
        key_code: &KeyCode,
        item: &dyn StorageItem,
    ) -> Result<UploadedFile>;

    /// Attach an encrypted text message to the package.
    fn encrypt_and_upload_message(
        &self,
        package_id: &str,
        key_code: &KeyCode,
        message: &str,
    ) -> Result<()>;

    /// Set the package expiration in days.
    fn update_package_life(&self, package_id: &str, days: u32) -> Result<()>;

    /// Grant `email` access to the package.
    fn add_recipient(&self, package_id: &str, email: &str) -> Result<()>;

    /// Lock the package and return its retrieval link.
    ///
    /// No files or recipients can be added once this succeeds.
    /// `RemoteError::ApproverRequired` is terminal for the run.
    fn finalize_package(
        &self,
        package_id: &str,
        key_code: &KeyCode,
        notify: bool,
    ) -> Result<PackageUrl>;
}

impl<C: PackageClient + ?Sized> PackageClient for &C {
    fn create_package(&self) -> Result<Package> {
        (**self).create_package()
    }

    fn encrypt_and_upload_file(
        &self,
        package_id: &str,
        key_code: &KeyCode,
        item: &dyn StorageItem,
    ) -> Result<UploadedFile> {
        (**self).encrypt_and_upload_file(package_id, key_code, item)
    }

    fn encrypt_and_upload_message(
        &self,
        package_id: &str,
        key_code: &KeyCode,
        message: &str,
    ) -> Result<()> {
        (**self).encrypt_and_upload_message(package_id, key_code, message)
    }

    fn update_package_life(&self, package_id: &str, days: u32) -> Result<()> {
        (**self).update_package_life(package_id, days)
    }

    fn add_recipient(&self, package_id: &str, email: &str) -> Result<()> {
        (**self).add_recipient(package_id, email)
    }

    fn finalize_package(
        &self,
        package_id: &str,
        key_code: &KeyCode,
        notify: bool,
    ) -> Result<PackageUrl> {
        (**self).finalize_package(package_id, key_code, notify)
    }
}
