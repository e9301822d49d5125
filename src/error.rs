//! Error types for tally mutation and configuration loading.
//!
//! The parser has no error type: every payload produces some record.

/// Errors raised by `ScanTally` mutations
#[derive(Debug, Clone, PartialEq)]
pub enum TallyError {
    UnknownCode(String),
    UnknownField(String),
    InvalidCount { code: String, count: i64 },
}

impl std::fmt::Display for TallyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyError::UnknownCode(code) => write!(f, "No tally entry for code: {}", code),
            TallyError::UnknownField(field) => write!(f, "Unknown record field: {}", field),
            TallyError::InvalidCount { code, count } => {
                write!(f, "Invalid count {} for code {}", count, code)
            }
        }
    }
}

impl std::error::Error for TallyError {}

/// Errors raised while loading `ParserConfig` / `TallyConfig`
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
