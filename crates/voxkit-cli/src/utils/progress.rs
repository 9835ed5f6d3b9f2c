//! Terminal progress bars for long-running operations.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use voxkit_core::ProgressSink;

struct ActiveBar {
    message: String,
    bar: ProgressBar,
}

/// A [`ProgressSink`] that draws one bar per distinct status message.
///
/// Reports with a percentage drive a 0-100 bar; reports without one show a
/// spinner. A new message finishes the current bar and starts another.
#[derive(Default)]
pub struct CliProgress {
    active: Mutex<Option<ActiveBar>>,
}

impl CliProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish the current bar, leaving it on screen.
    pub fn finish(&self) {
        if let Some(active) = self.lock().take() {
            active.bar.finish();
        }
    }

    /// Drop the current bar from the screen, e.g. after a failure.
    pub fn abandon(&self) {
        if let Some(active) = self.lock().take() {
            active.bar.abandon();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ActiveBar>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn create_percent_bar(message: &str) -> ProgressBar {
        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}",
        ) {
            bar.set_style(style.progress_chars("█▓░"));
        }
        bar.set_message(message.to_string());
        bar
    }

    fn create_spinner(message: &str) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }
}

impl ProgressSink for CliProgress {
    fn report(&self, message: &str, percent: Option<u8>) {
        let mut active = self.lock();

        let same_message = active.as_ref().is_some_and(|a| a.message == message);
        if !same_message {
            if let Some(previous) = active.take() {
                previous.bar.finish();
            }
            let bar = match percent {
                Some(_) => Self::create_percent_bar(message),
                None => Self::create_spinner(message),
            };
            *active = Some(ActiveBar {
                message: message.to_string(),
                bar,
            });
        }

        if let (Some(active), Some(pct)) = (active.as_ref(), percent) {
            active.bar.set_position(u64::from(pct.min(100)));
        }
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.finish();
    }
}
