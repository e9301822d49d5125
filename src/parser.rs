//! Gs1Parser - GS1 element-string decoding
//!
//! Turns one decoded payload into a normalized `ParsedRecord`:
//! - Linear AI codes (GS1-128): left-to-right AI scan, fixed and variable fields
//! - Matrix codes (Data Matrix): fixed character offsets
//!
//! Parsing never fails. An unrecognized AI ends the scan and whatever was
//! read so far is returned; any string yields at least `{ rawCode }`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

use crate::ai::{self, char_slice, expand_date, AiLength, ApplicationIdentifier, RecordField};
use crate::config::ParserConfig;
use crate::error::{ConfigError, TallyError};
use crate::sanitize::{sanitize, separator_offsets, strip_leading_marker, Gs1Gate};
use crate::symbology::{DecodedSymbol, Symbology};

// =============================================================================
// Types
// =============================================================================

/// Normalized output of parsing one payload
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecord {
    /// Payload with control characters stripped
    pub raw_code: String,
    /// AI 01
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// AI 17, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    /// AI 11, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produced: Option<String>,
    /// AI 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,
    /// Recognized AIs without a dedicated field, keyed by AI code
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

impl ParsedRecord {
    /// Record holding only the cleaned code
    pub fn raw(raw_code: impl Into<String>) -> Self {
        Self {
            raw_code: raw_code.into(),
            ..Self::default()
        }
    }

    /// True when no field beyond `raw_code` was extracted
    pub fn is_bare(&self) -> bool {
        self.device.is_none()
            && self.expiry.is_none()
            && self.produced.is_none()
            && self.lot.is_none()
            && self.extensions.is_empty()
    }

    /// Expiry as a calendar date; None when absent or not a real date
    /// (GS1 allows day "00" for "end of month")
    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry.as_deref().and_then(parse_iso_date)
    }

    pub fn produced_date(&self) -> Option<NaiveDate> {
        self.produced.as_deref().and_then(parse_iso_date)
    }

    /// Expired strictly before `on`
    pub fn is_expired(&self, on: NaiveDate) -> bool {
        self.expiry_date().map(|d| d < on).unwrap_or(false)
    }

    /// Empty values leave the field untouched
    fn assign(&mut self, ai: &ApplicationIdentifier, value: String) {
        if value.is_empty() {
            return;
        }
        let value = if ai.field.is_date() { expand_date(&value) } else { value };
        match ai.field {
            RecordField::Device => self.device = Some(value),
            RecordField::Expiry => self.expiry = Some(value),
            RecordField::Produced => self.produced = Some(value),
            RecordField::Lot => self.lot = Some(value),
            RecordField::Extension => {
                self.extensions.insert(ai.code.to_string(), value);
            }
        }
    }

    /// Manual correction of one field by name (`device`, `expiry`, `produced`,
    /// `lot`, or an extension AI code). An empty value clears the field.
    ///
    /// Corrected dates are stored as typed; they are not re-expanded.
    pub fn apply_correction(&mut self, field: &str, value: &str) -> Result<(), TallyError> {
        let value = value.trim();
        let new_value = if value.is_empty() { None } else { Some(value.to_string()) };

        match RecordField::from_name(field) {
            Some(RecordField::Device) => self.device = new_value,
            Some(RecordField::Expiry) => self.expiry = new_value,
            Some(RecordField::Produced) => self.produced = new_value,
            Some(RecordField::Lot) => self.lot = new_value,
            Some(RecordField::Extension) | None => match ai::by_code(field) {
                Some(known) if known.field == RecordField::Extension => match new_value {
                    Some(v) => {
                        self.extensions.insert(known.code.to_string(), v);
                    }
                    None => {
                        self.extensions.remove(known.code);
                    }
                },
                _ => return Err(TallyError::UnknownField(field.to_string())),
            },
        }
        Ok(())
    }
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse counters
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParseStats {
    pub parses: u64,
    /// Linear payloads rejected by the GS1 gate
    pub gated_out: u64,
    /// Linear scans that stopped on an unrecognized AI
    pub truncated: u64,
    pub last_parse_us: u64,
}

// =============================================================================
// Stateless parsing
// =============================================================================

/// Parse one payload. Pure; never fails; the GS1 gate is not applied.
pub fn parse(payload: &str, symbology: Symbology) -> ParsedRecord {
    parse_with(payload, symbology, false).0
}

/// Returns the record and whether a linear scan stopped on an unknown AI
fn parse_with(payload: &str, symbology: Symbology, keep_separators: bool) -> (ParsedRecord, bool) {
    let raw_code = sanitize(payload);

    match symbology {
        Symbology::LinearAiCode => {
            let breaks = if keep_separators { separator_offsets(payload) } else { Vec::new() };
            let chars: Vec<char> = raw_code.chars().collect();
            let mut record = ParsedRecord::raw(raw_code);
            let truncated = scan_element_string(&chars, &breaks, &mut record);
            (record, truncated)
        }
        Symbology::MatrixCode => (parse_matrix(payload, raw_code), false),
    }
}

/// Linear AI scan over the cleaned chars. `breaks` holds the positions where
/// a group separator stood; only variable-length fields stop at one. AI
/// prefixes and fixed-length fields read straight through.
///
/// Returns true when stopped by an unrecognized prefix.
fn scan_element_string(chars: &[char], breaks: &[usize], record: &mut ParsedRecord) -> bool {
    let len = chars.len();
    let mut i = 0;

    while i < len {
        let Some(ai) = ai::lookup_prefix(&chars[i..]) else {
            return true;
        };
        i += ai.code.len();

        let end = match ai.length {
            AiLength::Fixed(n) => (i + n).min(len),
            AiLength::Variable => breaks
                .iter()
                .copied()
                .find(|&b| b >= i && b < len)
                .unwrap_or(len),
        };

        record.assign(ai, char_slice(chars, i, end));
        i = end;
    }

    false
}

/// Fixed-offset matrix layout (after dropping one leading marker char):
///
/// ```text
/// [0,16)  device
/// [18,24) expiry   YYMMDD
/// [26,32) produced YYMMDD
/// [34,44) lot
/// ```
fn parse_matrix(payload: &str, raw_code: String) -> ParsedRecord {
    let chars: Vec<char> = strip_leading_marker(payload).chars().collect();
    let field = |start: usize, end: usize| {
        let value = char_slice(&chars, start, end);
        (!value.is_empty()).then_some(value)
    };

    ParsedRecord {
        raw_code,
        device: field(0, 16),
        expiry: field(18, 24).map(|v| expand_date(&v)),
        produced: field(26, 32).map(|v| expand_date(&v)),
        lot: field(34, 44),
        extensions: BTreeMap::new(),
    }
}

// =============================================================================
// Gs1Parser
// =============================================================================

/// Configured parser: GS1 gate + stats
#[wasm_bindgen]
pub struct Gs1Parser {
    config: ParserConfig,
    gate: Gs1Gate,
    stats: Cell<ParseStats>,
}

impl Default for Gs1Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Gs1Parser {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Build from a plain config object, e.g. `{ gs1Gate: false }`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn js_with_config(config: JsValue) -> Result<Gs1Parser, JsValue> {
        let config: ParserConfig = if config.is_undefined() || config.is_null() {
            ParserConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        Ok(Self::with_config(config))
    }

    /// Parse without the gate. `symbology` is a decoder format name or tag.
    #[wasm_bindgen(js_name = parse)]
    pub fn js_parse(&self, payload: &str, symbology: &str) -> Result<JsValue, JsValue> {
        let symbology = js_symbology(symbology)?;
        let record = self.parse(payload, symbology);
        self.log_parse(&record, symbology);
        to_js(&record)
    }

    /// Parse with the "likely GS1" gate applied to linear codes
    #[wasm_bindgen(js_name = parseGated)]
    pub fn js_parse_gated(&self, payload: &str, symbology: &str) -> Result<JsValue, JsValue> {
        let symbology = js_symbology(symbology)?;
        let record = self.parse_gated(payload, symbology);
        self.log_parse(&record, symbology);
        to_js(&record)
    }

    #[wasm_bindgen(js_name = looksLikeGs1)]
    pub fn js_looks_like_gs1(&self, payload: &str) -> bool {
        self.looks_like_gs1(payload)
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn js_stats(&self) -> JsValue {
        crate::to_js_value(&self.stats()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = resetStats)]
    pub fn reset_stats(&self) {
        self.stats.set(ParseStats::default());
    }
}

impl Gs1Parser {
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            gate: Gs1Gate::new(),
            stats: Cell::new(ParseStats::default()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(Self::with_config(ParserConfig::from_json(json)?))
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn stats(&self) -> ParseStats {
        self.stats.get()
    }

    /// Gate check on the sanitized payload
    pub fn looks_like_gs1(&self, payload: &str) -> bool {
        self.gate.accepts(&sanitize(payload))
    }

    /// Parse without the gate
    pub fn parse(&self, payload: &str, symbology: Symbology) -> ParsedRecord {
        self.run(payload, symbology, false)
    }

    /// Parse, treating linear payloads that fail the gate as `{ rawCode }`
    pub fn parse_gated(&self, payload: &str, symbology: Symbology) -> ParsedRecord {
        self.run(payload, symbology, self.config.gs1_gate)
    }

    pub fn parse_symbol(&self, symbol: &DecodedSymbol) -> ParsedRecord {
        self.parse_gated(&symbol.payload, symbol.symbology)
    }

    fn run(&self, payload: &str, symbology: Symbology, gated: bool) -> ParsedRecord {
        let start = instant::Instant::now();
        let mut stats = self.stats.get();
        stats.parses += 1;

        let cleaned = sanitize(payload);
        let record = if gated && symbology == Symbology::LinearAiCode && !self.gate.accepts(&cleaned) {
            stats.gated_out += 1;
            ParsedRecord::raw(cleaned)
        } else {
            let (record, truncated) = parse_with(payload, symbology, self.config.keep_separators);
            if truncated {
                stats.truncated += 1;
            }
            record
        };

        stats.last_parse_us = start.elapsed().as_micros() as u64;
        self.stats.set(stats);
        record
    }

    fn log_parse(&self, record: &ParsedRecord, symbology: Symbology) {
        if !self.config.verbose {
            return;
        }
        let line = format!(
            "[Gs1Parser] {} {:?} device={:?} expiry={:?} lot={:?}",
            symbology, record.raw_code, record.device, record.expiry, record.lot
        );
        web_sys::console::log_1(&line.into());
    }
}

fn js_symbology(name: &str) -> Result<Symbology, JsValue> {
    Symbology::from_format(name)
        .ok_or_else(|| JsValue::from_str(&format!("Unsupported symbology: {}", name)))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    crate::to_js_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// =============================================================================
// Tests
// =============================================================================
