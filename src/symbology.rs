//! Symbology tags for decoded optical codes
//!
//! The external decoder reports its format by name (`CODE_128`, `DATA_MATRIX`)
//! or by numeric ZXing `BarcodeFormat` id. Only two families carry fields this
//! crate knows how to read; every other format keeps its raw code only.

use serde::{Deserialize, Serialize};

/// Symbology family of a decoded payload
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Symbology {
    /// GS1-128 / Code 128: concatenated AI element string
    LinearAiCode,
    /// Data Matrix: fixed-offset positional fields
    MatrixCode,
}

impl Symbology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::LinearAiCode => "LINEAR_AI_CODE",
            Symbology::MatrixCode => "MATRIX_CODE",
        }
    }

    /// Map a decoder format name (or one of our own tags) to a symbology.
    ///
    /// Case-insensitive; `-`, ` ` and `_` are interchangeable.
    pub fn from_format(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalized.as_str() {
            "LINEARAICODE" | "CODE128" | "GS1128" | "EAN128" => Some(Symbology::LinearAiCode),
            "MATRIXCODE" | "DATAMATRIX" | "GS1DATAMATRIX" => Some(Symbology::MatrixCode),
            _ => None,
        }
    }

    /// Map a ZXing `BarcodeFormat` enum value
    pub fn from_format_id(id: u32) -> Option<Self> {
        match id {
            4 => Some(Symbology::LinearAiCode),
            5 => Some(Symbology::MatrixCode),
            _ => None,
        }
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw decode event
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DecodedSymbol {
    pub payload: String,
    pub symbology: Symbology,
}

impl DecodedSymbol {
    pub fn new(payload: impl Into<String>, symbology: Symbology) -> Self {
        Self {
            payload: payload.into(),
            symbology,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(Symbology::from_format("CODE_128"), Some(Symbology::LinearAiCode));
        assert_eq!(Symbology::from_format("gs1-128"), Some(Symbology::LinearAiCode));
        assert_eq!(Symbology::from_format("Ean 128"), Some(Symbology::LinearAiCode));
        assert_eq!(Symbology::from_format("DATA_MATRIX"), Some(Symbology::MatrixCode));
        assert_eq!(Symbology::from_format("datamatrix"), Some(Symbology::MatrixCode));
    }

    #[test]
    fn test_own_tags_round_trip_through_from_format() {
        for s in [Symbology::LinearAiCode, Symbology::MatrixCode] {
            assert_eq!(Symbology::from_format(s.as_str()), Some(s));
        }
    }

    #[test]
    fn test_unsupported_formats() {
        assert_eq!(Symbology::from_format("QR_CODE"), None);
        assert_eq!(Symbology::from_format("EAN_13"), None);
        assert_eq!(Symbology::from_format(""), None);
    }

    #[test]
    fn test_format_ids() {
        assert_eq!(Symbology::from_format_id(4), Some(Symbology::LinearAiCode));
        assert_eq!(Symbology::from_format_id(5), Some(Symbology::MatrixCode));
        assert_eq!(Symbology::from_format_id(11), None);
    }

    #[test]
    fn test_serde_tag() {
        let json = serde_json::to_string(&Symbology::MatrixCode).unwrap();
        assert_eq!(json, "\"MATRIX_CODE\"");
        let back: Symbology = serde_json::from_str("\"LINEAR_AI_CODE\"").unwrap();
        assert_eq!(back, Symbology::LinearAiCode);
    }
}
