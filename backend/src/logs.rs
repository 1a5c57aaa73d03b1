//! Console logging for pipeline runs.
//!
//! Every entry is printed with a level prefix. Tests can switch the global
//! logger into capture mode to assert on the diagnostics a run produced.

use once_cell::sync::Lazy;
use std::sync::Mutex;

/// Severity of a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn marker(&self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓",
            Self::Warning => "⚠️",
            Self::Error => "❌",
        }
    }
}

/// One console line of a run
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth under the previous line
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Console rendering: three spaces per nesting level, then the marker.
    pub fn render(&self) -> String {
        let indent = "   ".repeat(self.indent as usize + 1);
        format!("{}{} {}", indent, self.level.marker(), self.message)
    }
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Prints log entries, optionally recording them.
pub struct Logger {
    captured: Mutex<Option<Vec<LogEntry>>>,
}

impl Logger {
    pub fn new() -> Self {
        Self { captured: Mutex::new(None) }
    }

    /// Print an entry and record it if capture is on
    pub fn log(&self, entry: LogEntry) {
        println!("{}", entry.render());

        if let Ok(mut guard) = self.captured.lock() {
            if let Some(entries) = guard.as_mut() {
                entries.push(entry);
            }
        }
    }

    /// Start recording entries (clears anything recorded before)
    pub fn start_capture(&self) {
        if let Ok(mut guard) = self.captured.lock() {
            *guard = Some(Vec::new());
        }
    }

    /// Stop recording and return what was recorded
    pub fn take_captured(&self) -> Vec<LogEntry> {
        self.captured
            .lock()
            .ok()
            .and_then(|mut guard| guard.take())
            .unwrap_or_default()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOGGER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOGGER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::info(msg).with_indent(indent));
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::warning(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prefix_and_indent() {
        let entry = LogEntry::warning("3 rows").with_indent(1);
        assert_eq!(entry.render(), "      ⚠️ 3 rows");
        assert_eq!(LogEntry::info("x").render(), "    x");
        assert_eq!(LogEntry::success("ok").render(), "   ✓ ok");
    }

    #[test]
    fn test_local_logger_capture() {
        let logger = Logger::new();
        logger.log(LogEntry::info("before"));
        logger.start_capture();
        logger.log(LogEntry::error("boom"));
        let entries = logger.take_captured();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Error);
        assert!(logger.take_captured().is_empty());
    }
}
