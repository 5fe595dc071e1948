//! Destinations for records received through the table's `log` slot.

use luaf_abi::LogLevel;
use parking_lot::Mutex;

/// Target of the `tracing` events emitted by [`TracingSink`].
pub const EXTENSION_TARGET: &str = "luaf::ext";

/// Receives log records from extensions.
pub trait LogSink: Send + Sync {
    /// Handle one record.
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards records into `tracing` under [`EXTENSION_TARGET`].
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    prefix: String,
}

impl TracingSink {
    /// Sink without a prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that prepends `[prefix] ` to every message. An empty prefix adds
    /// nothing.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        if self.prefix.is_empty() {
            emit(level, format_args!("{message}"));
        } else {
            emit(level, format_args!("[{}] {message}", self.prefix));
        }
    }
}

fn emit(level: LogLevel, message: std::fmt::Arguments<'_>) {
    match level {
        LogLevel::Trace => tracing::trace!(target: EXTENSION_TARGET, "{message}"),
        LogLevel::Debug => tracing::debug!(target: EXTENSION_TARGET, "{message}"),
        LogLevel::Info => tracing::info!(target: EXTENSION_TARGET, "{message}"),
        LogLevel::Warn => tracing::warn!(target: EXTENSION_TARGET, "{message}"),
        LogLevel::Error => tracing::error!(target: EXTENSION_TARGET, "{message}"),
    }
}

/// One captured record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Record level
    pub level: LogLevel,
    /// Record text
    pub message: String,
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Take and clear the records.
    pub fn drain(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    /// Whether any record contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|record| record.message.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: LogLevel, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn log(&self, level: LogLevel, message: &str) {
        (**self).log(level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.log(LogLevel::Info, "first");
        sink.log(LogLevel::Error, "second");
        let records = sink.drain();
        assert_eq!(records.len(), 2);
        assert_eq!(records.first().map(|r| r.level), Some(LogLevel::Info));
        assert_eq!(records.last().map(|r| r.message.as_str()), Some("second"));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_tracing_sink_prefix() {
        assert_eq!(TracingSink::with_prefix("core").prefix(), "core");
        assert!(TracingSink::new().prefix().is_empty());
    }

    #[test]
    fn test_tracing_sink_accepts_every_level() {
        let sink = TracingSink::with_prefix("core");
        for level in LogLevel::ALL {
            sink.log(level, "message");
        }
    }
}
