//! Browser tests for the JS bindings. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use gs1scan::{Gs1Parser, ParsedRecord, ScanSession, ScanTally};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn parse_binding_returns_plain_object() {
    let parser = Gs1Parser::new();
    let value = parser
        .js_parse("0100012345678905240PART", "CODE_128")
        .unwrap();
    let record: ParsedRecord = serde_wasm_bindgen::from_value(value).unwrap();
    assert_eq!(record.device.as_deref(), Some("00012345678905"));
    assert_eq!(record.extensions.get("240").map(String::as_str), Some("PART"));
}

#[wasm_bindgen_test]
fn parse_binding_rejects_unknown_symbology() {
    let parser = Gs1Parser::new();
    assert!(parser.js_parse("0100012345678905", "QR_CODE").is_err());
}

#[wasm_bindgen_test]
fn tally_binding_round_trip() {
    let mut tally = ScanTally::js_with_config(JsValue::UNDEFINED).unwrap();
    let record = serde_wasm_bindgen::to_value(&ParsedRecord::raw("ABC")).unwrap();
    tally.js_record_scan_at(record, 0.0).unwrap();
    assert_eq!(tally.js_increment("ABC").unwrap(), 2);
    assert!(tally.js_increment("nope").is_err());

    let body = tally.js_submission_json().unwrap();
    assert!(body.contains("\"code\":\"ABC\""));
}

#[wasm_bindgen_test]
fn session_decode_binding() {
    let mut session = ScanSession::new();
    let value = session.js_on_decode("\u{1d}0100012345678905", "DATA_MATRIX");
    assert!(!value.is_null());
    assert_eq!(session.tally().total_units(), 1);
}
