//! Console logger sink for development hosts.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    log::{LogEntry, LogLevel, LoggerSink},
};

/// Prints forwarded log entries to stderr.
#[derive(Debug, Clone)]
pub struct ConsoleLoggerSink {
    min_level: LogLevel,
}

impl Default for ConsoleLoggerSink {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

impl ConsoleLoggerSink {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    /// One line per entry, fields sorted by key.
    pub fn format(entry: &LogEntry) -> String {
        let mut line = format!(
            "[{}] {} {}: {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.level.as_str(),
            entry.target,
            entry.message
        );

        let mut fields: Vec<_> = entry.fields.iter().collect();
        fields.sort();
        for (key, value) in fields {
            line.push_str(&format!(" {}={}", key, value));
        }

        if let Some(span) = &entry.span_id {
            line.push_str(&format!(" span={}", span));
        }

        line
    }
}

#[async_trait]
impl LoggerSink for ConsoleLoggerSink {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            eprintln!("{}", Self::format(&entry));
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}
