//! ScanTally: running count of scanned codes
//!
//! Owned, insertion-ordered table keyed by the cleaned code. Every mutation
//! goes through an explicit operation (record / increment / decrement /
//! remove / set_count / correct) so the page never touches shared state.
//!
//! The camera reports the same label on consecutive frames; repeat sightings
//! inside `TallyConfig::debounce_ms` are absorbed instead of counted.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use wasm_bindgen::prelude::*;

use crate::config::TallyConfig;
use crate::error::{ConfigError, TallyError};
use crate::parser::ParsedRecord;

// =============================================================================
// Types
// =============================================================================

/// One row of the tally
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TallyEntry {
    pub code: String,
    pub record: ParsedRecord,
    pub count: u32,
    pub first_seen_ms: u64,
    pub last_seen_ms: u64,
}

/// What `record` did with a sighting
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// New code, count 1
    Added,
    /// Known code, count incremented
    Counted,
    /// Known code seen again inside the debounce window
    Debounced,
    /// Empty code, nothing stored
    Ignored,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOutcome {
    pub status: ScanStatus,
    /// Count after the sighting (0 when ignored)
    pub count: u32,
}

/// Bulk submission body
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// RFC 3339, UTC
    pub submitted_at: String,
    pub items: Vec<SubmissionItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionItem {
    pub code: String,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produced: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

impl From<&TallyEntry> for SubmissionItem {
    fn from(entry: &TallyEntry) -> Self {
        Self {
            code: entry.code.clone(),
            count: entry.count,
            device: entry.record.device.clone(),
            expiry: entry.record.expiry.clone(),
            produced: entry.record.produced.clone(),
            lot: entry.record.lot.clone(),
            extensions: entry.record.extensions.clone(),
        }
    }
}

// =============================================================================
// ScanTally
// =============================================================================

#[wasm_bindgen]
pub struct ScanTally {
    config: TallyConfig,
    entries: Vec<TallyEntry>,
    /// code -> position in `entries`
    index: HashMap<String, usize>,
}

impl Default for ScanTally {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ScanTally {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_config(TallyConfig::default())
    }

    /// Build from a plain config object, e.g. `{ debounceMs: 0 }`
    #[wasm_bindgen(js_name = withConfig)]
    pub fn js_with_config(config: JsValue) -> Result<ScanTally, JsValue> {
        let config: TallyConfig = if config.is_undefined() || config.is_null() {
            TallyConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        Ok(Self::with_config(config))
    }

    /// Record a parsed record (as returned by `Gs1Parser.parse`) at the current time
    #[wasm_bindgen(js_name = recordScan)]
    pub fn js_record_scan(&mut self, record: JsValue) -> Result<JsValue, JsValue> {
        self.js_record_scan_at(record, js_sys::Date::now())
    }

    #[wasm_bindgen(js_name = recordScanAt)]
    pub fn js_record_scan_at(&mut self, record: JsValue, now_ms: f64) -> Result<JsValue, JsValue> {
        let record: ParsedRecord = serde_wasm_bindgen::from_value(record)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse record: {}", e)))?;
        let outcome = self.record(record, now_ms as u64);
        crate::to_js_value(&outcome)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = increment)]
    pub fn js_increment(&mut self, code: &str) -> Result<u32, JsValue> {
        self.increment(code).map_err(js_error)
    }

    #[wasm_bindgen(js_name = decrement)]
    pub fn js_decrement(&mut self, code: &str) -> Result<u32, JsValue> {
        self.decrement(code).map_err(js_error)
    }

    #[wasm_bindgen(js_name = remove)]
    pub fn js_remove(&mut self, code: &str) -> Result<(), JsValue> {
        self.remove(code).map(|_| ()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setCount)]
    pub fn js_set_count(&mut self, code: &str, count: u32) -> Result<(), JsValue> {
        self.set_count(code, count).map_err(js_error)
    }

    /// Manual correction of one field of an entry
    #[wasm_bindgen(js_name = correct)]
    pub fn js_correct(&mut self, code: &str, field: &str, value: &str) -> Result<(), JsValue> {
        self.correct(code, field, value).map_err(js_error)
    }

    /// All entries in first-seen order
    #[wasm_bindgen(js_name = entries)]
    pub fn js_entries(&self) -> JsValue {
        match crate::to_js_value(&self.entries) {
            Ok(v) => v,
            Err(e) => {
                web_sys::console::error_1(&format!("[ScanTally] Serialization failed: {:?}", e).into());
                JsValue::NULL
            }
        }
    }

    /// JSON body for the bulk submission POST
    #[wasm_bindgen(js_name = submissionJson)]
    pub fn js_submission_json(&self) -> Result<String, JsValue> {
        let submission = self.submission(js_sys::Date::now() as u64);
        if self.config.verbose {
            web_sys::console::log_1(
                &format!(
                    "[ScanTally] Submission built: {} codes, {} units",
                    submission.items.len(),
                    self.total_units()
                )
                .into(),
            );
        }
        serde_json::to_string(&submission)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = len)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    #[wasm_bindgen(js_name = totalUnits)]
    pub fn total_units(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }

    #[wasm_bindgen(js_name = clear)]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl ScanTally {
    pub fn with_config(config: TallyConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(Self::with_config(TallyConfig::from_json(json)?))
    }

    pub fn config(&self) -> &TallyConfig {
        &self.config
    }

    /// Count one sighting of `record`, keyed by its `raw_code`
    pub fn record(&mut self, record: ParsedRecord, now_ms: u64) -> ScanOutcome {
        if record.raw_code.is_empty() {
            return ScanOutcome { status: ScanStatus::Ignored, count: 0 };
        }

        let debounce_ms = self.config.debounce_ms;
        if let Some(entry) = self.entry_mut(&record.raw_code) {
            // Refreshed even when debounced: a label held in view counts once
            let since_last = now_ms.saturating_sub(entry.last_seen_ms);
            entry.last_seen_ms = now_ms;

            if debounce_ms > 0 && since_last < debounce_ms {
                return ScanOutcome { status: ScanStatus::Debounced, count: entry.count };
            }
            entry.count = entry.count.saturating_add(1);
            return ScanOutcome { status: ScanStatus::Counted, count: entry.count };
        }

        let code = record.raw_code.clone();
        self.index.insert(code.clone(), self.entries.len());
        self.entries.push(TallyEntry {
            code,
            record,
            count: 1,
            first_seen_ms: now_ms,
            last_seen_ms: now_ms,
        });
        ScanOutcome { status: ScanStatus::Added, count: 1 }
    }

    pub fn increment(&mut self, code: &str) -> Result<u32, TallyError> {
        let entry = self.require_mut(code)?;
        entry.count = entry.count.saturating_add(1);
        Ok(entry.count)
    }

    /// Decrement; an entry at 1 is removed and 0 returned
    pub fn decrement(&mut self, code: &str) -> Result<u32, TallyError> {
        let entry = self.require_mut(code)?;
        if entry.count > 1 {
            entry.count -= 1;
            return Ok(entry.count);
        }
        self.remove(code)?;
        Ok(0)
    }

    pub fn remove(&mut self, code: &str) -> Result<TallyEntry, TallyError> {
        let pos = self
            .index
            .remove(code)
            .ok_or_else(|| TallyError::UnknownCode(code.to_string()))?;
        let entry = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Ok(entry)
    }

    /// Overwrite a count; 0 removes the entry
    pub fn set_count(&mut self, code: &str, count: u32) -> Result<(), TallyError> {
        if count == 0 {
            return self.remove(code).map(|_| ());
        }
        self.require_mut(code)?.count = count;
        Ok(())
    }

    /// Signed adjustment from the count input box. Result below zero is rejected.
    pub fn adjust(&mut self, code: &str, delta: i64) -> Result<u32, TallyError> {
        let current = self.require(code)?.count as i64;
        let next = current + delta;
        if next < 0 || next > u32::MAX as i64 {
            return Err(TallyError::InvalidCount { code: code.to_string(), count: next });
        }
        self.set_count(code, next as u32)?;
        Ok(next as u32)
    }

    /// Manual correction of one field of an entry's record
    pub fn correct(&mut self, code: &str, field: &str, value: &str) -> Result<(), TallyError> {
        self.require_mut(code)?.record.apply_correction(field, value)
    }

    pub fn get(&self, code: &str) -> Option<&TallyEntry> {
        self.index.get(code).map(|&pos| &self.entries[pos])
    }

    pub fn entries(&self) -> &[TallyEntry] {
        &self.entries
    }

    /// Bulk submission body stamped with `now_ms`
    pub fn submission(&self, now_ms: u64) -> Submission {
        let submitted_at = i64::try_from(now_ms)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();

        Submission {
            submitted_at,
            items: self.entries.iter().map(SubmissionItem::from).collect(),
        }
    }

    fn entry_mut(&mut self, code: &str) -> Option<&mut TallyEntry> {
        let pos = *self.index.get(code)?;
        self.entries.get_mut(pos)
    }

    fn require(&self, code: &str) -> Result<&TallyEntry, TallyError> {
        self.get(code).ok_or_else(|| TallyError::UnknownCode(code.to_string()))
    }

    fn require_mut(&mut self, code: &str) -> Result<&mut TallyEntry, TallyError> {
        self.entry_mut(code)
            .ok_or_else(|| TallyError::UnknownCode(code.to_string()))
    }
}

/// Rejected operations always warn, regardless of `verbose`
fn js_error(e: TallyError) -> JsValue {
    web_sys::console::warn_1(&format!("[ScanTally] {}", e).into());
    JsValue::from_str(&e.to_string())
}

// =============================================================================
// Tests
// =============================================================================
