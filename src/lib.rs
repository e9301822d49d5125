//! gs1scan: GS1 Application Identifier Parser + Scan Tally
//!
//! A Rust/WASM implementation of the scanner page's decode pipeline. The
//! camera and the symbol decoder stay in JS; every decoded string is handed
//! here, parsed into a normalized record, and counted.
//!
//! # Architecture
//! - `symbology.rs` - Symbology tags, decoder format name mapping
//! - `sanitize.rs` - Control character stripping, "likely GS1" gate
//! - `ai.rs` - Application Identifier table and date expansion
//! - `parser.rs` - Gs1Parser: linear AI scan + matrix fixed offsets
//! - `tally.rs` - ScanTally: deduped running count, corrections, submission body
//! - `session.rs` - ScanSession: parser + tally behind one decode callback
//! - `config.rs` - Configuration types and defaults
//! - `error.rs` - Error types
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { ScanSession } from 'gs1scan';
//!
//! await init();
//! const session = new ScanSession();
//!
//! codeReader.decodeFromVideoDevice(deviceId, video, (result) => {
//!   if (!result) return;
//!   const { record, status, count } = session.onDecode(
//!     result.getText(),
//!     ZXing.BarcodeFormat[result.getBarcodeFormat()]
//!   );
//!   // record.device, record.expiry ("2024-01-01"), record.lot ...
//! });
//!
//! session.correct(code, 'lot', 'LOT43');
//! await fetch(url, { method: 'POST', body: session.submissionJson() });
//! ```

pub mod ai;
pub mod config;
pub mod error;
pub mod parser;
pub mod sanitize;
pub mod session;
pub mod symbology;
pub mod tally;

pub use config::*;
pub use error::*;
pub use parser::*;
pub use sanitize::{sanitize, Gs1Gate};
pub use session::*;
pub use symbology::*;
pub use tally::*;

use serde::Serialize;
use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("gs1scan v{}", env!("CARGO_PKG_VERSION"))
}

/// Strip control characters (JS binding)
#[wasm_bindgen(js_name = sanitize)]
pub fn js_sanitize(payload: &str) -> String {
    sanitize::sanitize(payload)
}

/// Plain JS objects rather than `Map`s for record extensions
pub(crate) fn to_js_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}
