//! Property tests for sanitization and the two parse layouts

use gs1scan::{parse, sanitize, Gs1Gate, Gs1Parser, ParserConfig, Symbology};
use proptest::prelude::*;
use proptest::test_runner::Config;

const NOISE: [char; 5] = ['\u{1d}', '\r', '\n', '\u{1e}', '\u{4}'];

/// `01` + GTIN with control characters dropped in at arbitrary positions
fn noisy_prefix(gtin: &str, noise: &[(usize, char)]) -> String {
    let mut prefix = format!("01{gtin}");
    for &(pos, c) in noise {
        prefix.insert(pos.min(prefix.len()), c);
    }
    prefix
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn sanitize_is_idempotent(payload in "[\\x00-\\x1f0-9A-Za-z é№]{0,48}") {
        let once = sanitize(&payload);
        prop_assert_eq!(sanitize(&once), once.clone());
        prop_assert!(once.chars().all(|c| c as u32 >= 0x20));
    }

    #[test]
    fn gtin_prefix_yields_device_in_both_separator_modes(
        gtin in "[0-9]{14}",
        noise in proptest::collection::vec((0usize..17, proptest::sample::select(NOISE.to_vec())), 0..5),
        tail in "[A-Z\\x1d\\r\\n]{0,20}|17[0-9]{6}|10[A-Z]{1,8}\\x1d21[0-9]{1,6}",
    ) {
        let payload = format!("{}{}", noisy_prefix(&gtin, &noise), tail);
        prop_assert!(Gs1Gate::new().accepts(&sanitize(&payload)));

        for config in [ParserConfig::default(), ParserConfig::strict()] {
            let record = Gs1Parser::with_config(config).parse_gated(&payload, Symbology::LinearAiCode);
            prop_assert_eq!(record.device.as_deref(), Some(gtin.as_str()));
        }
    }

    #[test]
    fn matrix_lot_is_chars_34_to_44(payload in "[ -~]{44,64}") {
        let record = parse(&payload, Symbology::MatrixCode);
        prop_assert_eq!(record.lot.as_deref(), Some(&payload[34..44]));
        prop_assert_eq!(record.device.as_deref(), Some(&payload[..16]));
        prop_assert_eq!(record.raw_code, payload);
    }

    #[test]
    fn matrix_leading_marker_is_skipped(
        payload in "[ -~]{0,64}",
        marker in proptest::sample::select(NOISE.to_vec()),
    ) {
        let plain = parse(&payload, Symbology::MatrixCode);
        let marked = parse(&format!("{marker}{payload}"), Symbology::MatrixCode);
        prop_assert_eq!(marked, plain);
    }
}
