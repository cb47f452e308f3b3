//! Run status reporting.
//!
//! A [`Report`] collects the human-readable trace of a run and its single
//! success or failure verdict. Recording never fails: a line whose
//! formatting errors is kept with whatever text was produced.

use std::fmt::{self, Write};

use tracing::info;

/// Final outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => f.write_str("success"),
            Verdict::Failure => f.write_str("failure"),
        }
    }
}

type Listener = Box<dyn FnMut(&str) + Send>;

/// Ordered progress lines plus one verdict.
#[derive(Default)]
pub struct Report {
    lines: Vec<String>,
    verdict: Option<Verdict>,
    listener: Option<Listener>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report that also hands every line to `listener` as it is recorded.
    pub fn with_listener(listener: impl FnMut(&str) + Send + 'static) -> Self {
        Self {
            listener: Some(Box::new(listener)),
            ..Self::default()
        }
    }

    /// Record one line.
    pub fn line(&mut self, args: fmt::Arguments<'_>) {
        let text = render(args);
        info!("{}", text);
        if let Some(listener) = self.listener.as_mut() {
            listener(&text);
        }
        self.lines.push(text);
    }

    /// Record a line in the trace without handing it to the listener.
    ///
    /// Used for the failure line of a run, whose error the caller receives
    /// on the outcome and presents itself.
    pub fn record(&mut self, args: fmt::Arguments<'_>) {
        let text = render(args);
        info!("{}", text);
        self.lines.push(text);
    }

    /// Settle the verdict. Only the first call has an effect.
    pub fn conclude(&mut self, verdict: Verdict) {
        if self.verdict.is_none() {
            self.verdict = Some(verdict);
        }
    }

    /// The verdict; a run that never concluded counts as failed.
    pub fn verdict(&self) -> Verdict {
        self.verdict.unwrap_or(Verdict::Failure)
    }

    pub fn is_success(&self) -> bool {
        self.verdict() == Verdict::Success
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The trace joined with newlines.
    pub fn trace(&self) -> String {
        self.lines.join("\n")
    }
}

fn render(args: fmt::Arguments<'_>) -> String {
    let mut text = String::new();
    if text.write_fmt(args).is_err() {
        text.push_str(" <formatting failed>");
    }
    text
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("lines", &self.lines)
            .field("verdict", &self.verdict)
            .finish()
    }
}

/// Record a formatted line on a [`Report`].
#[macro_export]
macro_rules! report {
    ($report:expr, $($arg:tt)*) => {
        $report.line(format_args!($($arg)*))
    };
}
