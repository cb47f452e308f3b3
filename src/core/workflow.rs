//! Upload orchestration.
//!
//! A [`Workflow`] drives one package through its lifecycle:
//!
//! ```text
//! Idle -> PackageCreated -> FilesUploading -> [MessageAttached] -> [LifetimeSet]
//!      -> [RecipientsAdded] -> Finalizing -> Finalized
//! ```
//!
//! Bracketed steps only run when configured. The first error moves the run
//! to `Failed` and skips everything after it. Nothing is retried and a
//! partially built package is left on the service as it is.

use std::fmt;

use tracing::debug;

use crate::core::cancel::CancelToken;
use crate::core::config::WorkflowConfig;
use crate::core::domain::{PackageUrl, UploadedFile};
use crate::core::remote::PackageClient;
use crate::core::report::{Report, Verdict};
use crate::core::storage::StorageItem;
use crate::core::types::PackageId;
use crate::error::{Error, FailureKind, Result, StorageError};
use crate::report;

/// Lifecycle position of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    PackageCreated,
    FilesUploading,
    MessageAttached,
    LifetimeSet,
    RecipientsAdded,
    Finalizing,
    Finalized,
    Failed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            State::Idle => "idle",
            State::PackageCreated => "package-created",
            State::FilesUploading => "files-uploading",
            State::MessageAttached => "message-attached",
            State::LifetimeSet => "lifetime-set",
            State::RecipientsAdded => "recipients-added",
            State::Finalizing => "finalizing",
            State::Finalized => "finalized",
            State::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct Outcome {
    /// `Finalized` or `Failed`
    pub state: State,
    /// Last state reached before failing; equals `state` on success
    pub reached: State,
    /// Package created by the run, if it got that far
    pub package_id: Option<PackageId>,
    /// Files uploaded, in upload order
    pub uploaded: Vec<UploadedFile>,
    pub url: Option<PackageUrl>,
    pub error: Option<Error>,
    pub report: Report,
}

impl Outcome {
    pub fn verdict(&self) -> Verdict {
        self.report.verdict()
    }

    pub fn is_success(&self) -> bool {
        self.state == State::Finalized
    }
}

/// Progress of the run in flight.
struct Progress {
    state: State,
    package_id: Option<PackageId>,
    uploaded: Vec<UploadedFile>,
    report: Report,
}

impl Progress {
    fn enter(&mut self, next: State) {
        debug!(from = %self.state, to = %next, "workflow transition");
        self.state = next;
    }
}

/// One upload run against a [`PackageClient`].
pub struct Workflow<C> {
    config: WorkflowConfig,
    client: C,
    cancel: CancelToken,
}

impl<C: PackageClient> Workflow<C> {
    pub fn new(config: WorkflowConfig, client: C) -> Self {
        Self {
            config,
            client,
            cancel: CancelToken::new(),
        }
    }

    /// Observe `cancel` before every remote call.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Upload `items` into a new package and finalize it.
    ///
    /// Never returns an error: every failure is logged, recorded on
    /// `report` and turned into a failed [`Outcome`].
    pub fn run(&self, items: &[Box<dyn StorageItem>], report: Report) -> Outcome {
        let mut progress = Progress {
            state: State::Idle,
            package_id: None,
            uploaded: Vec::new(),
            report,
        };

        match self.drive(items, &mut progress) {
            Ok(url) => {
                progress.enter(State::Finalized);
                report!(progress.report, "Package {} finalized.", url);
                if !url.notified.is_empty() {
                    report!(progress.report, "Notified {}.", url.notified.join(", "));
                }
                progress.report.conclude(Verdict::Success);

                Outcome {
                    state: State::Finalized,
                    reached: State::Finalized,
                    package_id: progress.package_id,
                    uploaded: progress.uploaded,
                    url: Some(url),
                    error: None,
                    report: progress.report,
                }
            }
            Err(err) => {
                let reached = progress.state;
                debug!(
                    state = %reached,
                    kind = %err.kind(),
                    cancelled = err.is_cancelled(),
                    "run failed: {}",
                    err
                );

                progress.report.record(format_args!("Upload failed: {}", err));
                if let Some(id) = &progress.package_id {
                    report!(progress.report, "Package {} was left unfinalized.", id);
                }
                progress.enter(State::Failed);
                progress.report.conclude(Verdict::Failure);

                Outcome {
                    state: State::Failed,
                    reached,
                    package_id: progress.package_id,
                    uploaded: progress.uploaded,
                    url: None,
                    error: Some(err),
                    report: progress.report,
                }
            }
        }
    }

    /// Stop before the operation of `kind` if cancellation was requested.
    fn checkpoint(&self, kind: FailureKind) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled(kind));
        }
        Ok(())
    }

    fn drive(&self, items: &[Box<dyn StorageItem>], progress: &mut Progress) -> Result<PackageUrl> {
        if items.is_empty() {
            return Err(StorageError::NoFiles.into());
        }
        report!(progress.report, "Found {} file(s) to upload.", items.len());

        self.checkpoint(FailureKind::CreatePackage)?;
        let package = self.client.create_package()?;
        progress.package_id = Some(package.id().to_string());
        progress.enter(State::PackageCreated);
        debug!(package = %package.id(), "package created");

        progress.enter(State::FilesUploading);
        for item in items {
            self.checkpoint(FailureKind::Upload)?;
            let file = self
                .client
                .encrypt_and_upload_file(package.id(), package.key_code(), item.as_ref())?;
            report!(progress.report, "Added {} to {}.", file, package.id());
            progress.uploaded.push(file);
        }

        if let Some(message) = self.config.message() {
            self.checkpoint(FailureKind::Message)?;
            self.client
                .encrypt_and_upload_message(package.id(), package.key_code(), message)?;
            report!(progress.report, "Attached message to {}.", package.id());
            progress.enter(State::MessageAttached);
        }

        if let Some(days) = self.config.life_days() {
            report!(progress.report, "Updating package life for {} to {}.", package.id(), days);
            self.checkpoint(FailureKind::Lifetime)?;
            self.client.update_package_life(package.id(), days)?;
            progress.enter(State::LifetimeSet);
        }

        let recipients = self.config.recipients();
        if !recipients.is_empty() {
            for email in recipients {
                self.checkpoint(FailureKind::Recipient)?;
                self.client.add_recipient(package.id(), email)?;
                report!(progress.report, "Added recipient {} to {}.", email, package.id());
            }
            progress.enter(State::RecipientsAdded);
        }

        progress.enter(State::Finalizing);
        self.checkpoint(FailureKind::Finalize)?;
        self.client
            .finalize_package(package.id(), package.key_code(), self.config.notify())
    }
}
