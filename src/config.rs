//! Configuration types and defaults for the parser and the tally
//!
//! Both structs deserialize from a plain JS object (via serde-wasm-bindgen)
//! or from JSON for native callers. Missing keys fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// Parser Configuration
// =============================================================================

/// Gs1Parser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserConfig {
    /// Apply the `^01\d{14}` "likely GS1" gate before parsing linear codes. Default: true
    pub gs1_gate: bool,
    /// Keep ASCII 29 while scanning linear codes so variable fields terminate
    /// at their separator. `rawCode` is sanitized regardless. Default: false
    pub keep_separators: bool,
    /// Log every parse to the browser console. Default: false
    pub verbose: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            gs1_gate: true,
            keep_separators: false,
            verbose: false,
        }
    }
}

impl ParserConfig {
    /// Gate on, separators honoured
    pub fn strict() -> Self {
        Self {
            gs1_gate: true,
            keep_separators: true,
            ..Self::default()
        }
    }

    /// Every linear payload is scanned, no gate
    pub fn permissive() -> Self {
        Self {
            gs1_gate: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// Tally Configuration
// =============================================================================

/// ScanTally configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TallyConfig {
    /// Repeat sightings of the same code within this window are ignored.
    /// The camera decodes the same label on consecutive frames. 0 disables. Default: 1500
    pub debounce_ms: u64,
    /// Log submission builds to the browser console. Warnings for rejected
    /// operations are printed either way. Default: false
    pub verbose: bool,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1500,
            verbose: false,
        }
    }
}

impl TallyConfig {
    /// Count every decode event
    pub fn no_debounce() -> Self {
        Self {
            debounce_ms: 0,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
