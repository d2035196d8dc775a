//! Analyzer configuration, deserialized from LSP `initializationOptions`.
//!
//! A `serde`-derived struct with `#[serde(default)]` so every field is
//! optional from the client's point of view, plus a `Default` impl that
//! documents the defaults in one place.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Debounce window for `LanguageService::updateLater`, in milliseconds.
    #[serde(rename = "debounceMillis")]
    pub debounce_millis: u64,

    /// Glob-style excludes applied during workspace scan, relative to the
    /// workspace root.
    #[serde(rename = "excludes")]
    pub excludes: Vec<String>,

    /// When true, diagnostics classified as "future" warnings (reserved
    /// for upcoming language versions) are suppressed.
    #[serde(rename = "suppressFutureWarnings")]
    pub suppress_future_warnings: bool,

    /// Logging verbosity honored by the ambient `env_logger` binding.
    #[serde(rename = "logLevel")]
    pub log_level: LogLevel,

    /// Maximum number of completion items returned before the list is
    /// marked incomplete.
    #[serde(rename = "completionItemLimit")]
    pub completion_item_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

pub const DEFAULT_DEBOUNCE_MILLIS: u64 = 1000;

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            debounce_millis: DEFAULT_DEBOUNCE_MILLIS,
            excludes: vec!["**/work/**".to_string(), "**/.nextflow/**".to_string()],
            suppress_future_warnings: false,
            log_level: LogLevel::Info,
            completion_item_limit: 200,
        }
    }
}
