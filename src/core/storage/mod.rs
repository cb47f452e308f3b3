//! Storage item abstraction.
//!
//! A [`StorageItem`] is a named blob of bytes with a known length. The
//! upload workflow only ever talks to this trait, so files can come from
//! local disk, memory, or any other backing without the workflow knowing
//! how bytes are physically read or written.
//!
//! ## Adding a New Storage Backend
//!
//! 1. Implement the `StorageItem` trait
//! 2. Add the implementation in a new file (e.g., `sftp.rs`, `bucket.rs`)
//! 3. Re-export from this module
//!
//! ## Example
//!
//! ```ignore
//! struct Bucket { /* ... */ }
//!
//! impl StorageItem for Bucket {
//!     fn name(&self) -> String {
//!         // Object key without the bucket prefix
//!     }
//!     fn length(&self) -> io::Result<u64> {
//!         // HEAD the object
//!     }
//!     // ...
//! }
//! ```
//!
//! Every operation except `delete` must honor the
//! [`CancelToken`](crate::core::cancel::CancelToken) the item was built with:
//! a cancelled item fails with an I/O error instead of completing.

use std::io::{self, Read, Write};

mod fs;
mod memory;

pub use fs::LocalFile;
pub use memory::{MemoryItem, MemoryStore};

/// Readable stream handed out by [`StorageItem::open_for_read`].
pub type ReadStream = Box<dyn Read + Send>;

/// Writable stream handed out by [`StorageItem::open_for_write`].
pub type WriteStream = Box<dyn Write + Send>;

/// A named, readable and writable blob of bytes.
///
/// Streams are closed when dropped, so they are released on every exit
/// path including errors and cancellation.
pub trait StorageItem: Send {
    /// Logical file name, used for display and remote metadata.
    ///
    /// No uniqueness is enforced.
    fn name(&self) -> String;

    /// Exact number of bytes [`open_for_read`](Self::open_for_read) will yield.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the underlying resource is inaccessible.
    fn length(&self) -> io::Result<u64>;

    /// Open a stream positioned at offset 0.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the resource no longer exists.
    fn open_for_read(&self) -> io::Result<ReadStream>;

    /// Open a stream that overwrites the resource.
    fn open_for_write(&self) -> io::Result<WriteStream>;

    /// Create a temporary item in the same storage scope as this one.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Leading part of the generated name
    /// * `suffix` - Trailing part of the generated name
    /// * `size_hint` - Expected size in bytes; advisory only
    fn create_sibling(
        &self,
        prefix: &str,
        suffix: &str,
        size_hint: u64,
    ) -> io::Result<Box<dyn StorageItem>>;

    /// Remove the underlying resource.
    ///
    /// Consumes the handle so a deleted item cannot be used again. Not
    /// interrupted by cancellation, so temporary items are still cleaned up
    /// after a cancelled run.
    fn delete(self: Box<Self>) -> io::Result<()>;
}

/// Read an item completely, verifying it yields exactly `length()` bytes.
pub fn read_all(item: &dyn StorageItem) -> io::Result<Vec<u8>> {
    let expected = item.length()?;
    let mut buf = Vec::with_capacity(usize::try_from(expected).unwrap_or(0));
    item.open_for_read()?.read_to_end(&mut buf)?;

    if buf.len() as u64 != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "{} changed while reading: expected {} bytes, read {}",
                item.name(),
                expected,
                buf.len()
            ),
        ));
    }
    Ok(buf)
}
