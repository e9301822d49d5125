//! ScanSession: parser + tally behind one decode callback
//!
//! The page's decode callback makes a single cross-boundary call per decoded
//! frame. Formats the parser does not understand (QR, EAN-13, ...) are still
//! tallied under their cleaned code.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::config::{ParserConfig, TallyConfig};
use crate::parser::{Gs1Parser, ParsedRecord};
use crate::sanitize::sanitize;
use crate::symbology::Symbology;
use crate::tally::{ScanStatus, ScanTally};

/// Result of one decode event
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DecodeResult {
    pub record: ParsedRecord,
    pub status: ScanStatus,
    pub count: u32,
}

#[wasm_bindgen]
pub struct ScanSession {
    parser: Gs1Parser,
    tally: ScanTally,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ScanSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_configs(ParserConfig::default(), TallyConfig::default())
    }

    /// `parser` and `tally` are optional plain config objects
    #[wasm_bindgen(js_name = withConfig)]
    pub fn js_with_config(parser: JsValue, tally: JsValue) -> Result<ScanSession, JsValue> {
        Ok(Self {
            parser: Gs1Parser::js_with_config(parser)?,
            tally: ScanTally::js_with_config(tally)?,
        })
    }

    /// Decode callback: `format` is the decoder's format name (`CODE_128`, ...)
    #[wasm_bindgen(js_name = onDecode)]
    pub fn js_on_decode(&mut self, payload: &str, format: &str) -> JsValue {
        let result = self.on_decode(payload, Symbology::from_format(format), js_sys::Date::now() as u64);
        if self.parser.config().verbose {
            web_sys::console::log_1(
                &format!("[ScanSession] {} {:?} -> {:?}", format, result.record.raw_code, result.status).into(),
            );
        }
        match crate::to_js_value(&result) {
            Ok(v) => v,
            Err(e) => {
                web_sys::console::error_1(&format!("[ScanSession] Serialization failed: {:?}", e).into());
                JsValue::NULL
            }
        }
    }

    #[wasm_bindgen(js_name = entries)]
    pub fn js_entries(&self) -> JsValue {
        self.tally.js_entries()
    }

    #[wasm_bindgen(js_name = increment)]
    pub fn js_increment(&mut self, code: &str) -> Result<u32, JsValue> {
        self.tally.js_increment(code)
    }

    #[wasm_bindgen(js_name = decrement)]
    pub fn js_decrement(&mut self, code: &str) -> Result<u32, JsValue> {
        self.tally.js_decrement(code)
    }

    #[wasm_bindgen(js_name = remove)]
    pub fn js_remove(&mut self, code: &str) -> Result<(), JsValue> {
        self.tally.js_remove(code)
    }

    #[wasm_bindgen(js_name = setCount)]
    pub fn js_set_count(&mut self, code: &str, count: u32) -> Result<(), JsValue> {
        self.tally.js_set_count(code, count)
    }

    #[wasm_bindgen(js_name = correct)]
    pub fn js_correct(&mut self, code: &str, field: &str, value: &str) -> Result<(), JsValue> {
        self.tally.js_correct(code, field, value)
    }

    #[wasm_bindgen(js_name = submissionJson)]
    pub fn js_submission_json(&self) -> Result<String, JsValue> {
        self.tally.js_submission_json()
    }

    /// Drop all counted codes, keep config
    #[wasm_bindgen(js_name = reset)]
    pub fn reset(&mut self) {
        self.tally.clear();
        self.parser.reset_stats();
    }
}

impl ScanSession {
    pub fn with_configs(parser: ParserConfig, tally: TallyConfig) -> Self {
        Self {
            parser: Gs1Parser::with_config(parser),
            tally: ScanTally::with_config(tally),
        }
    }

    /// Parse (gated) and count one decode event
    pub fn on_decode(&mut self, payload: &str, symbology: Option<Symbology>, now_ms: u64) -> DecodeResult {
        let record = match symbology {
            Some(symbology) => self.parser.parse_gated(payload, symbology),
            None => ParsedRecord::raw(sanitize(payload)),
        };
        let outcome = self.tally.record(record.clone(), now_ms);
        DecodeResult {
            record,
            status: outcome.status,
            count: outcome.count,
        }
    }

    pub fn parser(&self) -> &Gs1Parser {
        &self.parser
    }

    pub fn tally(&self) -> &ScanTally {
        &self.tally
    }

    pub fn tally_mut(&mut self) -> &mut ScanTally {
        &mut self.tally
    }
}
