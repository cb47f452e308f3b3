//! Test fixtures and constants.

use courier::core::cancel::CancelToken;
use courier::core::config::WorkflowConfig;
use courier::core::credential::Credential;
use courier::core::storage::{MemoryStore, StorageItem};

/// API key used by every test credential.
pub const API_KEY: &str = "test-api-key";

/// API secret used by every test credential.
pub const API_SECRET: &str = "test-api-secret";

/// Scrypt work factor that keeps sealing fast in tests.
pub const FAST_WORK_FACTOR: u8 = 10;

/// Files used across workflow tests.
pub const SAMPLE_FILES: &[(&str, &str)] = &[
    ("report.pdf", "%PDF-1.7 quarterly numbers"),
    ("build.tar.gz", "not really a tarball"),
    ("notes.txt", "remember to rotate the keys"),
];

pub fn credential() -> Credential {
    Credential::new(API_KEY, API_SECRET)
}

/// Default settings pointing at `endpoint`.
pub fn config(endpoint: &str) -> WorkflowConfig {
    WorkflowConfig::builder(credential())
        .endpoint(endpoint)
        .build()
        .expect("valid config")
}

/// Store `files` in a fresh memory store and box them as items.
pub fn memory_items(files: &[(&str, &str)]) -> (MemoryStore, Vec<Box<dyn StorageItem>>) {
    let store = MemoryStore::new(CancelToken::new());
    let items = files
        .iter()
        .map(|(name, contents)| {
            Box::new(store.insert(name, contents.as_bytes().to_vec())) as Box<dyn StorageItem>
        })
        .collect();
    (store, items)
}

/// `count` generated items named `file-<i>.bin`.
pub fn numbered_items(count: usize) -> Vec<Box<dyn StorageItem>> {
    let store = MemoryStore::new(CancelToken::new());
    (0..count)
        .map(|i| {
            let name = format!("file-{}.bin", i);
            Box::new(store.insert(&name, vec![i as u8; 16])) as Box<dyn StorageItem>
        })
        .collect()
}
