//! Core library components.
//!
//! Everything a run needs independent of the command line: storage items,
//! the remote package client, the upload workflow and its report.

pub mod cancel;
pub mod config;
pub mod constants;
pub mod credential;
pub mod domain;
pub mod enumerate;
pub mod remote;
pub mod report;
pub mod storage;
pub mod types;
pub mod workflow;
