//! In-memory storage.
//!
//! A [`MemoryStore`] is a flat namespace of blobs; every item it hands out
//! shares the store, so siblings land in the same scope.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ReadStream, StorageItem, WriteStream};
use crate::core::cancel::{CancelToken, Cancellable};

#[derive(Debug, Default)]
struct Blobs {
    entries: BTreeMap<String, Vec<u8>>,
    next_temp: u64,
}

/// Shared in-memory namespace.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    blobs: Arc<Mutex<Blobs>>,
    cancel: CancelToken,
}

impl MemoryStore {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            blobs: Arc::new(Mutex::new(Blobs::default())),
            cancel,
        }
    }

    /// Store `contents` under `name`, replacing any previous blob.
    pub fn insert(&self, name: &str, contents: Vec<u8>) -> MemoryItem {
        lock(&self.blobs)
            .entries
            .insert(name.to_string(), contents);
        self.item(name)
    }

    /// Handle to `name`, whether or not it currently exists.
    pub fn item(&self, name: &str) -> MemoryItem {
        MemoryItem {
            name: name.to_string(),
            store: self.clone(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.blobs).entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        lock(&self.blobs).entries.get(name).cloned()
    }

    /// Names currently stored, sorted.
    pub fn names(&self) -> Vec<String> {
        lock(&self.blobs).entries.keys().cloned().collect()
    }
}

// A poisoned lock still holds consistent blobs; every mutation is a single
// map operation.
fn lock(blobs: &Mutex<Blobs>) -> MutexGuard<'_, Blobs> {
    blobs.lock().unwrap_or_else(|e| e.into_inner())
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", name))
}

/// One named blob in a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryItem {
    name: String,
    store: MemoryStore,
}

impl StorageItem for MemoryItem {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn length(&self) -> io::Result<u64> {
        self.store.cancel.check()?;
        lock(&self.store.blobs)
            .entries
            .get(&self.name)
            .map(|b| b.len() as u64)
            .ok_or_else(|| not_found(&self.name))
    }

    fn open_for_read(&self) -> io::Result<ReadStream> {
        self.store.cancel.check()?;
        let snapshot = self.store.get(&self.name).ok_or_else(|| not_found(&self.name))?;
        Ok(Box::new(Cancellable::new(
            Cursor::new(snapshot),
            self.store.cancel.clone(),
        )))
    }

    fn open_for_write(&self) -> io::Result<WriteStream> {
        self.store.cancel.check()?;
        lock(&self.store.blobs)
            .entries
            .insert(self.name.clone(), Vec::new());
        Ok(Box::new(Cancellable::new(
            BlobWriter {
                name: self.name.clone(),
                blobs: Arc::clone(&self.store.blobs),
            },
            self.store.cancel.clone(),
        )))
    }

    fn create_sibling(
        &self,
        prefix: &str,
        suffix: &str,
        size_hint: u64,
    ) -> io::Result<Box<dyn StorageItem>> {
        self.store.cancel.check()?;
        let mut blobs = lock(&self.store.blobs);
        let name = loop {
            blobs.next_temp += 1;
            let candidate = format!("{}{}{}", prefix, blobs.next_temp, suffix);
            if !blobs.entries.contains_key(&candidate) {
                break candidate;
            }
        };
        let capacity = usize::try_from(size_hint).unwrap_or(0).min(1 << 20);
        blobs.entries.insert(name.clone(), Vec::with_capacity(capacity));
        drop(blobs);

        Ok(Box::new(self.store.item(&name)))
    }

    fn delete(self: Box<Self>) -> io::Result<()> {
        lock(&self.store.blobs)
            .entries
            .remove(&self.name)
            .map(|_| ())
            .ok_or_else(|| not_found(&self.name))
    }
}

/// Appends straight into the shared blob.
struct BlobWriter {
    name: String,
    blobs: Arc<Mutex<Blobs>>,
}

impl Write for BlobWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut blobs = lock(&self.blobs);
        let blob = blobs
            .entries
            .get_mut(&self.name)
            .ok_or_else(|| not_found(&self.name))?;
        blob.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
