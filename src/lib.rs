//! Courier - Encrypted package delivery from the command line.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── send          # Enumerate, upload and finalize a package
//! │   ├── check         # Validate configuration offline
//! │   └── output        # Terminal output helpers
//! └── core/             # Core library components
//!     ├── config        # courier.toml and validated run settings
//!     ├── credential    # Credential providers
//!     ├── cancel        # Cooperative cancellation
//!     ├── storage/      # Storage item backends
//!     │   ├── mod       # StorageItem trait
//!     │   ├── fs        # Local disk
//!     │   └── memory    # In-memory
//!     ├── remote/       # Remote package service
//!     │   ├── mod       # PackageClient trait
//!     │   ├── http      # REST client
//!     │   └── seal      # age passphrase encryption
//!     ├── enumerate     # Glob-based file selection
//!     ├── workflow      # Upload orchestration
//!     └── report        # Progress lines and verdict
//! ```
//!
//! # Features
//!
//! - Client-side encryption, the key code never leaves the machine
//! - Pluggable storage backends behind one narrow trait
//! - Fail-fast workflow with a single success or failure verdict
//! - Cancellation observed at every blocking step

pub mod cli;
pub mod core;
pub mod error;
