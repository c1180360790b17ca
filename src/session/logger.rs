//! Session event logger
//!
//! Same model as a game log: a verbosity threshold, an output mode choosing
//! between stdout and an in-memory capture buffer, and optional categories so
//! tests and tools can pick out command outcomes or reconcile events.

use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::ops::Deref;

/// Verbosity level for session output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbosityLevel {
    /// Silent - no output
    Silent = 0,
    /// Minimal - failures only
    Minimal = 1,
    /// Normal - command outcomes and prompt changes (default)
    #[default]
    Normal = 2,
    /// Verbose - every reconcile step and guard decision
    Verbose = 3,
}

impl std::str::FromStr for VerbosityLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityLevel::Silent),
            "minimal" | "1" => Ok(VerbosityLevel::Minimal),
            "normal" | "2" => Ok(VerbosityLevel::Normal),
            "verbose" | "3" => Ok(VerbosityLevel::Verbose),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

/// Output format for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Machine-readable JSON output (one object per line)
    Json,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to in-memory buffer (no stdout)
    Memory,
    /// Both stdout and in-memory buffer
    Both,
}

/// Log categories used by the session
pub mod category {
    pub const COMMAND: &str = "command";
    pub const RECONCILE: &str = "reconcile";
    pub const PROMPT: &str = "prompt";
    pub const SELECTION: &str = "selection";
}

/// A captured log entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Read-only access to captured entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> LogGuard<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }

    /// Entries with the given category
    pub fn in_category(&self, category: &str) -> Vec<&LogEntry> {
        self.guard
            .iter()
            .filter(|e| e.category.as_deref() == Some(category))
            .collect()
    }
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Logger shared by every session component
///
/// Logging takes `&self`; the capture buffer sits in a `RefCell` so the logger
/// can be used from inside `&self` session methods.
pub struct SessionLogger {
    verbosity: VerbosityLevel,
    output_format: OutputFormat,
    output_mode: OutputMode,
    log_buffer: RefCell<Vec<LogEntry>>,
}

impl SessionLogger {
    /// Create a new logger with default verbosity (Normal)
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        SessionLogger {
            verbosity,
            output_format: OutputFormat::default(),
            output_mode: OutputMode::default(),
            log_buffer: RefCell::new(Vec::new()),
        }
    }

    /// Logger that only captures, never prints
    pub fn capturing(verbosity: VerbosityLevel) -> Self {
        let mut logger = Self::with_verbosity(verbosity);
        logger.set_output_mode(OutputMode::Memory);
        logger
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    /// Access captured entries
    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    pub fn clear_logs(&self) {
        self.log_buffer.borrow_mut().clear();
    }

    #[inline]
    pub fn minimal(&self, category: &str, message: &str) {
        self.log(VerbosityLevel::Minimal, category, message);
    }

    #[inline]
    pub fn normal(&self, category: &str, message: &str) {
        self.log(VerbosityLevel::Normal, category, message);
    }

    #[inline]
    pub fn verbose(&self, category: &str, message: &str) {
        self.log(VerbosityLevel::Verbose, category, message);
    }

    /// Messages above the verbosity threshold are neither printed nor captured
    fn log(&self, level: VerbosityLevel, category: &str, message: &str) {
        if level == VerbosityLevel::Silent || level > self.verbosity {
            return;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            category: Some(category.to_string()),
        };

        if matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both) {
            self.log_to_stdout(&entry);
        }
        if self.is_capturing() {
            self.log_buffer.borrow_mut().push(entry);
        }
    }

    fn log_to_stdout(&self, entry: &LogEntry) {
        match self.output_format {
            OutputFormat::Text => {
                if entry.level == VerbosityLevel::Minimal {
                    println!("{}", entry.message);
                } else {
                    println!("  {}", entry.message);
                }
            }
            OutputFormat::Json => match serde_json::to_string(entry) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("failed to encode log entry: {e}"),
            },
        }
    }
}

impl Default for SessionLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}
