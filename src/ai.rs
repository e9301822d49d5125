//! GS1 Application Identifier table
//!
//! Only the identifiers the scanner page ever needed are recognized. Anything
//! else at a scan position ends the scan (best-effort partial record).
//!
//! | AI  | Title              | Length     | Field     |
//! |-----|--------------------|------------|-----------|
//! | 00  | SSCC               | fixed 18   | extension |
//! | 01  | GTIN               | fixed 14   | device    |
//! | 10  | BATCH/LOT          | variable   | lot       |
//! | 11  | PROD DATE          | fixed 6    | produced  |
//! | 17  | USE BY / EXPIRY    | fixed 6    | expiry    |
//! | 21  | SERIAL             | variable   | extension |
//! | 240 | ADDITIONAL ID      | variable   | extension |
//! | 241 | CUST. PART No.     | variable   | extension |

use serde::{Deserialize, Serialize};

/// Value length policy of an AI
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiLength {
    Fixed(usize),
    /// Runs to the next group separator or end of input
    Variable,
}

/// Record slot an AI value lands in
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordField {
    Device,
    Expiry,
    Produced,
    Lot,
    Extension,
}

impl RecordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Device => "device",
            RecordField::Expiry => "expiry",
            RecordField::Produced => "produced",
            RecordField::Lot => "lot",
            RecordField::Extension => "extension",
        }
    }

    /// Correctable record slots, by `as_str` name. Extensions go by AI code.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            RecordField::Device,
            RecordField::Expiry,
            RecordField::Produced,
            RecordField::Lot,
        ]
        .into_iter()
        .find(|field| field.as_str() == name)
    }

    /// Date fields are normalized from YYMMDD
    pub fn is_date(&self) -> bool {
        matches!(self, RecordField::Expiry | RecordField::Produced)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationIdentifier {
    pub code: &'static str,
    pub title: &'static str,
    pub length: AiLength,
    pub field: RecordField,
}

// 3-digit codes first: "240" must not be read as "24" + "0..."
pub static APPLICATION_IDENTIFIERS: &[ApplicationIdentifier] = &[
    ApplicationIdentifier { code: "240", title: "ADDITIONAL ID", length: AiLength::Variable, field: RecordField::Extension },
    ApplicationIdentifier { code: "241", title: "CUST. PART No.", length: AiLength::Variable, field: RecordField::Extension },
    ApplicationIdentifier { code: "00", title: "SSCC", length: AiLength::Fixed(18), field: RecordField::Extension },
    ApplicationIdentifier { code: "01", title: "GTIN", length: AiLength::Fixed(14), field: RecordField::Device },
    ApplicationIdentifier { code: "10", title: "BATCH/LOT", length: AiLength::Variable, field: RecordField::Lot },
    ApplicationIdentifier { code: "11", title: "PROD DATE", length: AiLength::Fixed(6), field: RecordField::Produced },
    ApplicationIdentifier { code: "17", title: "USE BY OR EXPIRY", length: AiLength::Fixed(6), field: RecordField::Expiry },
    ApplicationIdentifier { code: "21", title: "SERIAL", length: AiLength::Variable, field: RecordField::Extension },
];

/// Look up an AI by its code
pub fn by_code(code: &str) -> Option<&'static ApplicationIdentifier> {
    APPLICATION_IDENTIFIERS.iter().find(|ai| ai.code == code)
}

/// Match a known AI at the start of `chars`, longest code first
pub fn lookup_prefix(chars: &[char]) -> Option<&'static ApplicationIdentifier> {
    APPLICATION_IDENTIFIERS.iter().find(|ai| {
        let len = ai.code.len();
        chars.len() >= len && ai.code.chars().zip(&chars[..len]).all(|(a, &b)| a == b)
    })
}

/// Match a known AI at char position `pos` of `text`
pub fn lookup_at(text: &str, pos: usize) -> Option<&'static ApplicationIdentifier> {
    let chars: Vec<char> = text.chars().skip(pos).take(3).collect();
    lookup_prefix(&chars)
}

/// `YYMMDD` -> `20YY-MM-DD`
///
/// The century is always "20". Short input yields a shorter string with the
/// separators still in place; never panics.
pub fn expand_date(yymmdd: &str) -> String {
    let chars: Vec<char> = yymmdd.chars().collect();
    format!(
        "20{}-{}-{}",
        char_slice(&chars, 0, 2),
        char_slice(&chars, 2, 4),
        char_slice(&chars, 4, 6)
    )
}

/// Clamped `[start, end)` char slice, empty when out of range
pub fn char_slice(chars: &[char], start: usize, end: usize) -> String {
    let end = end.min(chars.len());
    if start >= end {
        return String::new();
    }
    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_exactly_the_recognized_set() {
        let mut codes: Vec<&str> = APPLICATION_IDENTIFIERS.iter().map(|ai| ai.code).collect();
        codes.sort();
        assert_eq!(codes, vec!["00", "01", "10", "11", "17", "21", "240", "241"]);
    }

    #[test]
    fn test_fixed_lengths() {
        assert_eq!(by_code("00").unwrap().length, AiLength::Fixed(18));
        assert_eq!(by_code("01").unwrap().length, AiLength::Fixed(14));
        assert_eq!(by_code("11").unwrap().length, AiLength::Fixed(6));
        assert_eq!(by_code("17").unwrap().length, AiLength::Fixed(6));
        for code in ["10", "21", "240", "241"] {
            assert_eq!(by_code(code).unwrap().length, AiLength::Variable);
        }
    }

    #[test]
    fn test_three_digit_codes_win() {
        assert_eq!(lookup_at("240ABC", 0).unwrap().code, "240");
        assert_eq!(lookup_at("241ABC", 0).unwrap().code, "241");
    }

    #[test]
    fn test_lookup_offsets_and_misses() {
        assert_eq!(lookup_at("xx17240101", 2).unwrap().code, "17");
        assert!(lookup_at("99123", 0).is_none());
        assert!(lookup_at("24", 0).is_none()); // "24" alone is not an AI
        assert!(lookup_at("1", 0).is_none());
        assert!(lookup_at("", 0).is_none());
    }

    #[test]
    fn test_expand_date() {
        assert_eq!(expand_date("240101"), "2024-01-01");
        assert_eq!(expand_date("230515"), "2023-05-15");
        // No century inference
        assert_eq!(expand_date("991231"), "2099-12-31");
    }

    #[test]
    fn test_expand_short_date() {
        assert_eq!(expand_date("2401"), "2024-01-");
        assert_eq!(expand_date(""), "20--");
    }

    #[test]
    fn test_field_names() {
        assert_eq!(RecordField::from_name("lot"), Some(RecordField::Lot));
        assert_eq!(RecordField::from_name("extension"), None);
        for field in [RecordField::Device, RecordField::Expiry, RecordField::Produced] {
            assert_eq!(RecordField::from_name(field.as_str()), Some(field));
        }
        assert!(RecordField::Expiry.is_date());
        assert!(!RecordField::Device.is_date());
    }
}
