//! Cooperative cancellation.
//!
//! A [`CancelToken`] is shared between the code driving a run and the
//! storage and remote layers doing the blocking work. Observed cancellation
//! surfaces as a plain I/O error, the same kind as any other access failure.
//! `ErrorKind::Interrupted` is avoided because std's `read_to_end` and
//! `io::copy` silently retry on it.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Payload of the I/O error produced by an observed cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Whether an I/O error was produced by [`CancelToken::check`].
pub fn is_cancellation(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|inner| inner.is::<Cancelled>())
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return an I/O error once cancellation was requested.
    pub fn check(&self) -> io::Result<()> {
        if self.is_cancelled() {
            Err(io::Error::new(io::ErrorKind::Other, Cancelled))
        } else {
            Ok(())
        }
    }
}

/// Stream wrapper that checks a [`CancelToken`] before every read or write.
pub struct Cancellable<S> {
    inner: S,
    token: CancelToken,
}

impl<S> Cancellable<S> {
    pub fn new(inner: S, token: CancelToken) -> Self {
        Self { inner, token }
    }
}

impl<R: Read> Read for Cancellable<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.token.check()?;
        self.inner.read(buf)
    }
}

impl<W: Write> Write for Cancellable<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.token.check()?;
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.token.check()?;
        self.inner.flush()
    }
}
