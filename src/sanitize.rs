//! Payload sanitization and the "likely GS1" gate
//!
//! Decoders hand back FNC1 group separators (ASCII 29) and other control
//! characters embedded in the text. Everything below 0x20 is stripped before
//! a payload is stored or compared.

use regex::Regex;

/// GS1 group separator (FNC1 in variable-length position)
pub const GROUP_SEPARATOR: char = '\u{1d}';

#[inline]
pub fn is_control(c: char) -> bool {
    (c as u32) < 0x20
}

/// Remove every control character (0x00-0x1F)
pub fn sanitize(payload: &str) -> String {
    payload.chars().filter(|&c| !is_control(c)).collect()
}

/// Char positions in `sanitize(payload)` where a group separator was removed.
/// Sorted; a run of separators reports the same position more than once.
pub fn separator_offsets(payload: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut kept = 0;
    for c in payload.chars() {
        if c == GROUP_SEPARATOR {
            offsets.push(kept);
        } else if !is_control(c) {
            kept += 1;
        }
    }
    offsets
}

/// Drop exactly one leading control character, if present
pub fn strip_leading_marker(payload: &str) -> &str {
    let mut chars = payload.chars();
    match chars.next() {
        Some(c) if is_control(c) => chars.as_str(),
        _ => payload,
    }
}

/// Pre-check deciding whether a linear payload is worth scanning as GS1
///
/// Arbitrary Code 128 labels (asset tags, shipping refs) would otherwise be
/// misread as element strings.
#[derive(Debug, Clone)]
pub struct Gs1Gate {
    // ASCII digits only; `\d` would admit other Unicode Nd characters
    pattern: Regex,
}

impl Default for Gs1Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gs1Gate {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"^01[0-9]{14}").unwrap(),
        }
    }

    /// True when the cleaned payload starts with AI 01 and a 14-digit GTIN
    pub fn accepts(&self, cleaned: &str) -> bool {
        self.pattern.is_match(cleaned)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Requirement 1: All of 0x00-0x1F is removed, nothing else
    // -------------------------------------------------------------------------
    #[test]
    fn test_strips_control_range() {
        let all_controls: String = (0u8..0x20).map(|b| b as char).collect();
        assert_eq!(sanitize(&all_controls), "");
        assert_eq!(sanitize("\u{1d}01\u{1d}234\r\n"), "01234");
        assert_eq!(sanitize(" ~\u{7f}é"), " ~\u{7f}é");
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Idempotent
    // -------------------------------------------------------------------------
    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "plain",
            "\u{1d}0100012345678905\u{1d}10LOT\u{1d}",
            "\u{0}\u{1f}\u{20}\u{1e}x",
            "ünïcödé\tstring",
        ];
        for s in samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once);
        }
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Separator positions map onto the cleaned string
    // -------------------------------------------------------------------------
    #[test]
    fn test_separator_offsets() {
        let payload = "\u{1e}10LOT\u{1d}21SER\r";
        assert_eq!(sanitize(payload), "10LOT21SER");
        assert_eq!(separator_offsets(payload), vec![5]);

        assert_eq!(separator_offsets("\u{1d}01\u{1d}\u{1d}2"), vec![0, 2, 2]);
        assert!(separator_offsets("no separators\r\n").is_empty());
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Leading marker strip removes one char only
    // -------------------------------------------------------------------------
    #[test]
    fn test_strip_leading_marker() {
        assert_eq!(strip_leading_marker("\u{1d}0123"), "0123");
        assert_eq!(strip_leading_marker("\u{1d}\u{1d}0123"), "\u{1d}0123");
        assert_eq!(strip_leading_marker("0123"), "0123");
        assert_eq!(strip_leading_marker(""), "");
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Gate
    // -------------------------------------------------------------------------
    #[test]
    fn test_gate_accepts_gtin_prefix() {
        let gate = Gs1Gate::new();
        assert!(gate.accepts("0100012345678905"));
        assert!(gate.accepts("010001234567890517240101"));
    }

    #[test]
    fn test_gate_rejects_other_payloads() {
        let gate = Gs1Gate::new();
        assert!(!gate.accepts(""));
        assert!(!gate.accepts("010001234567890")); // 13 digits
        assert!(!gate.accepts("0200012345678905"));
        assert!(!gate.accepts("x0100012345678905"));
        assert!(!gate.accepts("01000123456789O5")); // letter O
        assert!(!gate.accepts("01٠٠٠١٢٣٤٥٦٧٨٩٠٥")); // Arabic-Indic digits
    }
}
