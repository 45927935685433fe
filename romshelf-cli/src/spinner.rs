//! Single-line spinner for long-running commands.
//!
//! Log output written while the spinner is visible goes through
//! [`Spinner::suspend`] so the two don't interleave on the terminal.

use std::borrow::Cow;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub(crate) struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create a ticking spinner. When `quiet` is true it is never drawn.
    pub(crate) fn new(quiet: bool) -> Self {
        let pb = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };

        let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("/-\\|");
        pb.set_style(style);
        if !quiet {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub(crate) fn set_message(&self, msg: impl Into<Cow<'static, str>>) {
        self.pb.set_message(msg);
    }

    /// Hide the spinner while `f` writes to the terminal.
    pub(crate) fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.pb.suspend(f)
    }

    pub(crate) fn finish(&self) {
        self.pb.disable_steady_tick();
        self.pb.finish_and_clear();
    }
}
