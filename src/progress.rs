// src/progress.rs

//! Shared progress tracking trait and implementations
//!
//! Passes report one step per candidate file through the `ProgressTracker`
//! trait, independent of how (or whether) the progress is displayed:
//! - `CliProgress`: Visual progress bar using indicatif
//! - `LogProgress`: Logs progress to tracing
//! - `SilentProgress`: No-op for library callers and quiet mode
//!
//! # Example
//!
//! ```ignore
//! use booster::progress::{CliProgress, ProgressTracker};
//!
//! let progress = CliProgress::new("Decompressing", 0);
//! let report = tree.decompress_all_with_progress(&progress)?;
//! progress.finish_with_message("done");
//! ```

use indicatif::ProgressBar;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Core trait for progress tracking
///
/// Implementations are thread-safe (Send + Sync).
pub trait ProgressTracker: Send + Sync {
    /// Set the current status message (the file being processed)
    fn set_message(&self, message: &str);

    /// Increment progress by the given amount
    fn increment(&self, amount: u64);

    /// Set the total amount of work
    fn set_length(&self, length: u64);

    /// Get current position
    fn position(&self) -> u64;

    /// Get total length
    fn length(&self) -> u64;

    /// Mark progress as complete with a final message
    fn finish_with_message(&self, message: &str);
}

/// Silent progress tracker (no output)
#[derive(Debug, Default)]
pub struct SilentProgress {
    position: AtomicU64,
    length: AtomicU64,
}

impl SilentProgress {
    /// Create a new silent progress tracker
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressTracker for SilentProgress {
    fn set_message(&self, _message: &str) {}

    fn increment(&self, amount: u64) {
        self.position.fetch_add(amount, Ordering::Relaxed);
    }

    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    fn length(&self) -> u64 {
        self.length.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, _message: &str) {}
}

/// Logging progress tracker
///
/// Logs progress updates to tracing at info level, roughly every 10%.
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    position: AtomicU64,
    length: AtomicU64,
    /// Log every N increments; 0 = derive from length
    log_interval: u64,
}

impl LogProgress {
    /// Create a new logging progress tracker
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            position: AtomicU64::new(0),
            length: AtomicU64::new(length),
            log_interval: 0,
        }
    }

    /// Set the logging interval
    pub fn with_log_interval(mut self, interval: u64) -> Self {
        self.log_interval = interval;
        self
    }

    fn interval(&self, length: u64) -> u64 {
        if self.log_interval > 0 {
            self.log_interval
        } else {
            std::cmp::max(1, length / 10)
        }
    }
}

impl ProgressTracker for LogProgress {
    fn set_message(&self, message: &str) {
        debug!("{}: {}", self.name, message);
    }

    fn increment(&self, amount: u64) {
        let old_pos = self.position.fetch_add(amount, Ordering::Relaxed);
        let new_pos = old_pos + amount;
        let length = self.length.load(Ordering::Relaxed);

        if length > 0 {
            let interval = self.interval(length);
            if new_pos / interval > old_pos / interval {
                let percent = (new_pos * 100) / length;
                info!("{}: {}% ({}/{})", self.name, percent, new_pos, length);
            }
        }
    }

    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    fn length(&self) -> u64 {
        self.length.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }
}

/// Terminal progress bar
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Create a progress bar; `length` may be 0 and set later
    pub fn new(name: &str, length: u64) -> Self {
        let bar = ProgressBar::new(length);
        bar.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("{prefix} ({pos}/{len}) [{bar:40.green/dim}] {percent}% {wide_msg}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.set_prefix(name.to_string());
        Self { bar }
    }
}

impl ProgressTracker for CliProgress {
    fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    fn set_length(&self, length: u64) {
        self.bar.set_length(length);
    }

    fn position(&self) -> u64 {
        self.bar.position()
    }

    fn length(&self) -> u64 {
        self.bar.length().unwrap_or(0)
    }

    fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_progress() {
        let progress = SilentProgress::new();
        progress.set_length(100);

        progress.set_message("blobs/sha256/aa/data");
        progress.increment(10);
        assert_eq!(progress.position(), 10);
        assert_eq!(progress.length(), 100);
        progress.finish_with_message("done");
    }

    #[test]
    fn test_log_progress() {
        let progress = LogProgress::new("test", 100);

        progress.increment(25);
        assert_eq!(progress.position(), 25);

        progress.set_message("layer");
        progress.increment(25);
        assert_eq!(progress.position(), 50);
        progress.finish_with_message("complete");
    }

    #[test]
    fn test_log_progress_zero_length() {
        let progress = LogProgress::new("empty", 0).with_log_interval(5);
        progress.increment(3);
        assert_eq!(progress.position(), 3);
    }

    #[test]
    fn test_cli_progress_hidden_terminal() {
        let progress = CliProgress::new("test", 0);
        progress.set_length(4);
        progress.set_message("layer");
        progress.increment(3);
        assert_eq!(progress.position(), 3);
        assert_eq!(progress.length(), 4);
        progress.finish_with_message("done");
    }
}
