//! Reporting sink for diagnostic lines.
//!
//! The registry reports what it does through a [`ReportSink`]. How lines are
//! rendered is up to the sink; the default forwards them to the `log` facade.

use log::Level;
use std::sync::{Mutex, PoisonError};

/// Line-oriented diagnostic output.
pub trait ReportSink: Send + Sync {
    fn line(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.line(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.line(Level::Warn, message);
    }

    fn debug(&self, message: &str) {
        self.line(Level::Debug, message);
    }
}

/// Forwards lines to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn line(&self, level: Level, message: &str) {
        log::log!(target: "varspace::report", level, "{}", message);
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines, oldest first.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded messages at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl ReportSink for BufferSink {
    fn line(&self, level: Level, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

impl<T: ReportSink + ?Sized> ReportSink for std::sync::Arc<T> {
    fn line(&self, level: Level, message: &str) {
        (**self).line(level, message);
    }
}
