// src/report.rs

//! Progress reporting contract between the task runner and the presentation
//! layer.
//!
//! The runner emits [`ReportEvent`]s over an unbounded channel so that
//! reporting never blocks the worker; whoever owns the receiver decides how
//! to render them. [`spawn_console_renderer`] is the built-in console
//! implementation: `replace_last` updates are drawn in place with a carriage
//! return, everything else is appended with a severity prefix, and the task
//! exits once `Ready` arrives.

use std::io::{self, Write};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Visual tag for a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

/// Events sent from the runner to the presentation layer.
#[derive(Debug, Clone)]
pub enum ReportEvent {
    Update {
        text: String,
        severity: Option<Severity>,
        /// Wipe all prior output before appending.
        clear: bool,
        /// Replace the most recently appended line instead of appending.
        replace_last: bool,
    },
    /// Emitted exactly once per run, after all tasks or cancellation; the
    /// caller may re-enable task submission.
    Ready,
}

/// Cheap clonable sender half of the reporting contract.
#[derive(Debug, Clone)]
pub struct Reporter {
    tx: mpsc::UnboundedSender<ReportEvent>,
}

impl Reporter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ReportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: ReportEvent) {
        // A closed receiver just means nobody is rendering anymore.
        let _ = self.tx.send(event);
    }

    pub fn update(&self, text: impl Into<String>, severity: Option<Severity>) {
        self.send(ReportEvent::Update {
            text: text.into(),
            severity,
            clear: false,
            replace_last: false,
        });
    }

    pub fn info(&self, text: impl Into<String>) {
        self.update(text, Some(Severity::Info));
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.update(text, Some(Severity::Warning));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.update(text, Some(Severity::Error));
    }

    pub fn success(&self, text: impl Into<String>) {
        self.update(text, Some(Severity::Success));
    }

    /// In-place progress line (percentages during a copy).
    pub fn progress(&self, text: impl Into<String>) {
        self.send(ReportEvent::Update {
            text: text.into(),
            severity: None,
            clear: false,
            replace_last: true,
        });
    }

    /// Wipe all prior output.
    pub fn clear(&self) {
        self.send(ReportEvent::Update {
            text: String::new(),
            severity: None,
            clear: true,
            replace_last: false,
        });
    }

    pub fn ready(&self) {
        self.send(ReportEvent::Ready);
    }
}

/// Render reporter events to stdout until `Ready` arrives.
pub fn spawn_console_renderer(
    mut rx: mpsc::UnboundedReceiver<ReportEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // Tracks whether the cursor sits on an unfinished progress line.
        let mut line_open = false;
        while let Some(event) = rx.recv().await {
            match event {
                ReportEvent::Ready => break,
                ReportEvent::Update {
                    text,
                    severity,
                    clear,
                    replace_last,
                } => {
                    if clear {
                        if line_open {
                            println!();
                            line_open = false;
                        }
                        if text.is_empty() {
                            continue;
                        }
                    }
                    if replace_last {
                        print!("\r{text}\x1b[K");
                        let _ = io::stdout().flush();
                        line_open = true;
                    } else {
                        if line_open {
                            println!();
                            line_open = false;
                        }
                        match severity {
                            Some(Severity::Warning) => println!("warning: {text}"),
                            Some(Severity::Error) => println!("error: {text}"),
                            Some(Severity::Success) => println!("ok: {text}"),
                            Some(Severity::Info) | None => println!("{text}"),
                        }
                    }
                }
            }
        }
        if line_open {
            println!();
        }
    })
}
