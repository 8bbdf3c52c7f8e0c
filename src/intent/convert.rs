//! Converter intents: the answer is a pure function of the query text.

use super::{starts_with_any, truncate, IntentMatcher};
use crate::action::{Action, ActionEffect, HashAlgorithm};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref RE_LONG_DIGITS: Regex = Regex::new(r"\d{8,}").unwrap();
    static ref RE_TS_PREFIXED: Regex = Regex::new(r"^(?:epoch|unix|timestamp)\s+(\d{8,13})$").unwrap();
    static ref RE_TS_BARE: Regex = Regex::new(r"^(\d{10,13})$").unwrap();

    static ref RE_NUMBER_BASE: Regex = Regex::new(
        r"(?i)^(0x[0-9a-f]+|0b[01]+|0o[0-7]+|\d+)\s+(?:to\s+)?(hex|dec(?:imal)?|bin(?:ary)?|oct(?:al)?)"
    ).unwrap();

    static ref RE_B64_DECODE: Regex = Regex::new(r"(?i)^(?:base64|b64)\s+(?:decode|dec)\s+(.+)").unwrap();
    static ref RE_B64_ENCODE: Regex = Regex::new(r"(?i)^(?:base64|b64)\s+(?:encode\s+|enc\s+)?(.+)").unwrap();

    static ref RE_URL_DECODE: Regex = Regex::new(r"(?i)^(?:url\s*decode|urldecode|decodeuri)\s+(.+)").unwrap();
    static ref RE_URL_ENCODE: Regex = Regex::new(r"(?i)^(?:url\s*encode|urlencode|encodeuri)\s+(.+)").unwrap();

    static ref RE_COLOR_HEX: Regex = Regex::new(r"^(?:color\s+)?#([0-9a-fA-F]{3}(?:[0-9a-fA-F]{3})?)$").unwrap();
    static ref RE_COLOR_RGB: Regex =
        Regex::new(r"(?i)^(?:color\s+)?rgb\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)$").unwrap();

    static ref RE_HASH: Regex = Regex::new(r"(?i)^(sha-?256|sha-?1|sha-?384|sha-?512|hash)\s+(.+)").unwrap();

    static ref RE_SEPARATED_CHAR: Regex = Regex::new(r"[^a-zA-Z0-9]+(.)").unwrap();
    static ref RE_LOWER_UPPER: Regex = Regex::new(r"([a-z])([A-Z])").unwrap();
    static ref RE_SPACE_DASH: Regex = Regex::new(r"[\s-]+").unwrap();
    static ref RE_SPACE_UNDERSCORE: Regex = Regex::new(r"[\s_]+").unwrap();
    static ref RE_TITLE_WORD: Regex = Regex::new(r"[A-Za-z0-9_]\S*").unwrap();

    static ref CASE_RULES: Vec<CaseRule> = vec![
        CaseRule::new(r"(?i)^(?:upper(?:case)?|to\s*upper)\s+(.+)", "UPPERCASE", upper_case),
        CaseRule::new(r"(?i)^(?:lower(?:case)?|to\s*lower)\s+(.+)", "lowercase", lower_case),
        CaseRule::new(r"(?i)^(?:title(?:\s*case)?|to\s*title)\s+(.+)", "Title Case", title_case),
        CaseRule::new(r"(?i)^(?:camel(?:\s*case)?|to\s*camel)\s+(.+)", "camelCase", camel_case),
        CaseRule::new(r"(?i)^(?:snake(?:\s*case)?|to\s*snake)\s+(.+)", "snake_case", snake_case),
        CaseRule::new(r"(?i)^(?:kebab(?:\s*case)?|to\s*kebab)\s+(.+)", "kebab-case", kebab_case),
        CaseRule::new(r"(?i)^(?:pascal(?:\s*case)?|to\s*pascal)\s+(.+)", "PascalCase", pascal_case),
        CaseRule::new(r"(?i)^(?:constant(?:\s*case)?|to\s*constant|screaming)\s+(.+)", "CONSTANT_CASE", constant_case),
    ];

    static ref RE_WORD_COUNT: Regex =
        Regex::new(r"(?i)^(?:count|wc|wordcount|word\s*count|len|length)\s+(.+)").unwrap();
    static ref RE_REVERSE: Regex = Regex::new(r"(?i)^(?:reverse|rev|flip)\s+(.+)").unwrap();
}

/// Standard alphabet that tolerates missing padding and stray trailing bits.
const LENIENT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Captured group `n`, trimmed; `None` when it trims to nothing.
fn captured<'q>(caps: &Captures<'q>, n: usize) -> Option<&'q str> {
    caps.get(n).map(|m| m.as_str().trim()).filter(|s| !s.is_empty())
}

// ============================================================================
// Timestamp
// ============================================================================

/// Values above this are read as milliseconds.
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

pub struct Timestamp;

impl IntentMatcher for Timestamp {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let ql = query.trim().to_lowercase();

        if starts_with_any(&ql, &["now", "timestamp", "unix", "current time"]) && !RE_LONG_DIGITS.is_match(&ql)
        {
            let now = Utc::now().timestamp().to_string();
            let mut action = Action::smart_effect(
                "smart-timestamp-now".to_string(),
                "Current Unix Timestamp".to_string(),
                now.clone(),
                "Clock",
                ActionEffect::CopyCurrentTimestamp,
            );
            action.result = Some(now);
            return Some(vec![action]);
        }

        let digits = RE_TS_PREFIXED
            .captures(&ql)
            .or_else(|| RE_TS_BARE.captures(&ql))
            .and_then(|c| c[1].parse::<i64>().ok())?;

        let millis = if digits > MILLIS_THRESHOLD { digits } else { digits.checked_mul(1000)? };
        let date = DateTime::<Utc>::from_timestamp_millis(millis)?;

        let iso = date.to_rfc3339_opts(SecondsFormat::Millis, true);
        let local = date.with_timezone(&Local).format("%-m/%-d/%Y, %-I:%M:%S %p");

        Some(vec![Action::smart_copy(
            "smart-timestamp-convert",
            "Convert Timestamp".to_string(),
            format!("{} · {}", iso, local),
            "Calendar",
            iso,
        )])
    }
}

// ============================================================================
// Number base
// ============================================================================

pub struct NumberBase;

fn parse_radix_literal(input: &str) -> Option<u128> {
    let lower = input.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u128::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u128::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u128::from_str_radix(oct, 8).ok()
    } else {
        lower.parse().ok()
    }
}

impl IntentMatcher for NumberBase {
    fn name(&self) -> &'static str {
        "number-base"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let caps = RE_NUMBER_BASE.captures(query)?;
        let input = &caps[1];
        let target = caps[2].to_lowercase();
        let value = parse_radix_literal(input)?;

        let (result, label) = if target.starts_with("hex") {
            (format!("0x{:X}", value), "Hexadecimal")
        } else if target.starts_with("dec") {
            (value.to_string(), "Decimal")
        } else if target.starts_with("bin") {
            (format!("0b{:b}", value), "Binary")
        } else {
            (format!("0o{:o}", value), "Octal")
        };

        Some(vec![Action::smart_copy(
            "smart-number-base",
            format!("{} → {}", input, label),
            result.clone(),
            "Binary",
            result,
        )])
    }
}

// ============================================================================
// Base64
// ============================================================================

pub struct Base64;

impl IntentMatcher for Base64 {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        // a recognized decode request never falls through to encoding
        if let Some(caps) = RE_B64_DECODE.captures(query) {
            let bytes = LENIENT_B64.decode(captured(&caps, 1)?).ok()?;
            let decoded = String::from_utf8(bytes).ok()?;
            return Some(vec![Action::smart_copy(
                "smart-b64-decode",
                "Base64 Decode".to_string(),
                decoded.clone(),
                "FileCode",
                decoded,
            )]);
        }

        let caps = RE_B64_ENCODE.captures(query)?;
        let encoded = STANDARD.encode(captured(&caps, 1)?);
        Some(vec![Action::smart_copy(
            "smart-b64-encode",
            "Base64 Encode".to_string(),
            encoded.clone(),
            "FileCode",
            encoded,
        )])
    }
}

// ============================================================================
// URL encoding
// ============================================================================

pub struct UrlCodec;

/// A `%` not followed by two hex digits.
fn has_malformed_escape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit) && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

impl IntentMatcher for UrlCodec {
    fn name(&self) -> &'static str {
        "url"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        if let Some(caps) = RE_URL_DECODE.captures(query) {
            let input = captured(&caps, 1)?;
            if has_malformed_escape(input) {
                return None;
            }
            let decoded = urlencoding::decode(input).ok()?.into_owned();
            return Some(vec![Action::smart_copy(
                "smart-url-decode",
                "URL Decode".to_string(),
                decoded.clone(),
                "Link",
                decoded,
            )]);
        }

        let caps = RE_URL_ENCODE.captures(query)?;
        let encoded = urlencoding::encode(captured(&caps, 1)?).into_owned();
        Some(vec![Action::smart_copy(
            "smart-url-encode",
            "URL Encode".to_string(),
            encoded.clone(),
            "Link",
            encoded,
        )])
    }
}

// ============================================================================
// Color
// ============================================================================

pub struct Color;

impl IntentMatcher for Color {
    fn name(&self) -> &'static str {
        "color"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        if let Some(caps) = RE_COLOR_HEX.captures(query) {
            let short = &caps[1];
            let hex: String = if short.len() == 3 {
                short.chars().flat_map(|c| [c, c]).collect()
            } else {
                short.to_string()
            };
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
            let rgb = format!("rgb({}, {}, {})", r, g, b);
            return Some(vec![Action::smart_copy(
                "smart-color-hex",
                format!("#{} → RGB", hex.to_uppercase()),
                rgb.clone(),
                "Palette",
                rgb,
            )]);
        }

        let caps = RE_COLOR_RGB.captures(query)?;
        // components above 255 do not name a color
        let r: u8 = caps[1].parse().ok()?;
        let g: u8 = caps[2].parse().ok()?;
        let b: u8 = caps[3].parse().ok()?;
        let hex = format!("#{:02X}{:02X}{:02X}", r, g, b);
        Some(vec![Action::smart_copy(
            "smart-color-rgb",
            format!("rgb({}, {}, {}) → HEX", r, g, b),
            hex.clone(),
            "Palette",
            hex,
        )])
    }
}

// ============================================================================
// Hash
// ============================================================================

pub struct Hash;

impl IntentMatcher for Hash {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let caps = RE_HASH.captures(query)?;
        let algorithm = match caps[1].to_lowercase().replace('-', "").as_str() {
            "sha1" => HashAlgorithm::Sha1,
            "sha384" => HashAlgorithm::Sha384,
            "sha512" => HashAlgorithm::Sha512,
            _ => HashAlgorithm::Sha256,
        };
        let input = captured(&caps, 2)?;

        Some(vec![Action::smart_effect(
            "smart-hash".to_string(),
            format!("{} Hash", algorithm.name()),
            format!("Hash of \"{}\"", truncate(input, 40)),
            "ShieldCheck",
            ActionEffect::CopyDigest {
                algorithm,
                input: input.to_string(),
            },
        )])
    }
}

// ============================================================================
// Case conversion
// ============================================================================

struct CaseRule {
    pattern: Regex,
    label: &'static str,
    transform: fn(&str) -> String,
}

impl CaseRule {
    fn new(pattern: &str, label: &'static str, transform: fn(&str) -> String) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            label,
            transform,
        }
    }
}

fn upper_case(s: &str) -> String {
    s.to_uppercase()
}

fn lower_case(s: &str) -> String {
    s.to_lowercase()
}

fn camel_case(s: &str) -> String {
    RE_SEPARATED_CHAR
        .replace_all(&s.to_lowercase(), |c: &Captures| c[1].to_uppercase())
        .into_owned()
}

fn pascal_case(s: &str) -> String {
    let joined = RE_SEPARATED_CHAR.replace_all(s, |c: &Captures| c[1].to_uppercase());
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn snake_case(s: &str) -> String {
    let split = RE_LOWER_UPPER.replace_all(s, "${1}_${2}");
    RE_SPACE_DASH.replace_all(&split, "_").to_lowercase()
}

fn kebab_case(s: &str) -> String {
    let split = RE_LOWER_UPPER.replace_all(s, "${1}-${2}");
    RE_SPACE_UNDERSCORE.replace_all(&split, "-").to_lowercase()
}

fn title_case(s: &str) -> String {
    RE_TITLE_WORD
        .replace_all(s, |c: &Captures| {
            let mut chars = c[0].chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .into_owned()
}

fn constant_case(s: &str) -> String {
    snake_case(s).to_uppercase()
}

pub struct CaseConversion;

impl IntentMatcher for CaseConversion {
    fn name(&self) -> &'static str {
        "case"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let (rule, caps) = CASE_RULES
            .iter()
            .find_map(|rule| rule.pattern.captures(query).map(|c| (rule, c)))?;
        let result = (rule.transform)(caps.get(1)?.as_str().trim());

        Some(vec![Action::smart_copy(
            "smart-case",
            rule.label.to_string(),
            result.clone(),
            "CaseSensitive",
            result,
        )])
    }
}

// ============================================================================
// Word count
// ============================================================================

pub struct WordCount;

impl IntentMatcher for WordCount {
    fn name(&self) -> &'static str {
        "word-count"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let caps = RE_WORD_COUNT.captures(query)?;
        let input = captured(&caps, 1)?;

        let words = input.split_whitespace().count();
        let chars = input.chars().count();
        let lines = input.split('\n').count();
        let result = format!("{} words, {} characters, {} lines", words, chars, lines);

        Some(vec![Action::smart_copy("smart-wc", "Word Count".to_string(), result.clone(), "Hash", result)])
    }
}

// ============================================================================
// Reverse
// ============================================================================

pub struct Reverse;

impl IntentMatcher for Reverse {
    fn name(&self) -> &'static str {
        "reverse"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let caps = RE_REVERSE.captures(query)?;
        let result: String = captured(&caps, 1)?.chars().rev().collect();
        Some(vec![Action::smart_copy(
            "smart-reverse",
            "Reversed".to_string(),
            result.clone(),
            "ArrowLeftRight",
            result,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_of(matcher: &dyn IntentMatcher, query: &str) -> Option<String> {
        matcher.attempt(query).and_then(|actions| actions[0].result.clone())
    }

    #[test]
    fn test_timestamp_now() {
        let actions = Timestamp.attempt("now").unwrap();
        assert_eq!(actions[0].id, "smart-timestamp-now");
        assert_eq!(actions[0].effect, ActionEffect::CopyCurrentTimestamp);
        let secs: i64 = actions[0].result.as_deref().unwrap().parse().unwrap();
        assert!((secs - Utc::now().timestamp()).abs() <= 2);
        assert!(Timestamp.attempt("current time").is_some());
    }

    #[test]
    fn test_timestamp_conversion() {
        assert_eq!(result_of(&Timestamp, "1700000000").as_deref(), Some("2023-11-14T22:13:20.000Z"));
        assert_eq!(result_of(&Timestamp, "1700000000000").as_deref(), Some("2023-11-14T22:13:20.000Z"));
        assert_eq!(result_of(&Timestamp, "unix 1700000000").as_deref(), Some("2023-11-14T22:13:20.000Z"));
        assert_eq!(result_of(&Timestamp, "epoch 0017000000").as_deref(), Some("1970-07-16T18:13:20.000Z"));
        // nine bare digits are too short to be a timestamp
        assert!(Timestamp.attempt("170000000").is_none());
    }

    #[test]
    fn test_number_base() {
        assert_eq!(result_of(&NumberBase, "255 to hex").as_deref(), Some("0xFF"));
        assert_eq!(result_of(&NumberBase, "0xFF to dec").as_deref(), Some("255"));
        assert_eq!(result_of(&NumberBase, "10 bin").as_deref(), Some("0b1010"));
        assert_eq!(result_of(&NumberBase, "0b1010 to octal").as_deref(), Some("0o12"));
        assert_eq!(NumberBase.attempt("255 to hex").unwrap()[0].label, "255 → Hexadecimal");
    }

    #[test]
    fn test_number_base_beyond_53_bits() {
        assert_eq!(
            result_of(&NumberBase, "0xFFFFFFFFFFFFFFFF to dec").as_deref(),
            Some("18446744073709551615")
        );
        assert!(NumberBase.attempt("255 to roman").is_none());
    }

    #[test]
    fn test_base64() {
        assert_eq!(result_of(&Base64, "base64 hello").as_deref(), Some("aGVsbG8="));
        assert_eq!(result_of(&Base64, "b64 encode hi there").as_deref(), Some("aGkgdGhlcmU="));
        assert_eq!(result_of(&Base64, "b64 decode aGVsbG8=").as_deref(), Some("hello"));
        assert_eq!(result_of(&Base64, "base64 dec aGVsbG8").as_deref(), Some("hello"));
    }

    #[test]
    fn test_base64_bad_decode_does_not_encode() {
        assert!(Base64.attempt("b64 decode !!!").is_none());
        // valid base64 but not UTF-8
        assert!(Base64.attempt("b64 decode //79").is_none());
    }

    #[test]
    fn test_url_codec() {
        assert_eq!(result_of(&UrlCodec, "url encode a b&c").as_deref(), Some("a%20b%26c"));
        assert_eq!(result_of(&UrlCodec, "urldecode a%20b%26c").as_deref(), Some("a b&c"));
        assert_eq!(result_of(&UrlCodec, "decodeuri caf%C3%A9").as_deref(), Some("café"));
        assert!(UrlCodec.attempt("url decode 100%").is_none());
        assert!(UrlCodec.attempt("url decode %zz").is_none());
    }

    #[test]
    fn test_color() {
        assert_eq!(result_of(&Color, "#ff8800").as_deref(), Some("rgb(255, 136, 0)"));
        assert_eq!(result_of(&Color, "color #f80").as_deref(), Some("rgb(255, 136, 0)"));
        assert_eq!(Color.attempt("#f80").unwrap()[0].label, "#FF8800 → RGB");
        assert_eq!(result_of(&Color, "rgb(255, 136, 0)").as_deref(), Some("#FF8800"));
        assert!(Color.attempt("rgb(256, 0, 0)").is_none());
        assert!(Color.attempt("#ff88").is_none());
    }

    #[test]
    fn test_hash_is_deferred() {
        let actions = Hash.attempt("sha-1 abc").unwrap();
        assert_eq!(actions[0].label, "SHA-1 Hash");
        assert_eq!(actions[0].result, None);
        assert_eq!(
            actions[0].effect,
            ActionEffect::CopyDigest {
                algorithm: HashAlgorithm::Sha1,
                input: "abc".to_string()
            }
        );
        assert_eq!(Hash.attempt("hash x").unwrap()[0].label, "SHA-256 Hash");
        let long = "a".repeat(60);
        assert_eq!(
            Hash.attempt(&format!("sha512 {}", long)).unwrap()[0].description,
            format!("Hash of \"{}...\"", "a".repeat(40))
        );
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(result_of(&CaseConversion, "upper abc").as_deref(), Some("ABC"));
        assert_eq!(result_of(&CaseConversion, "lowercase ABC").as_deref(), Some("abc"));
        assert_eq!(result_of(&CaseConversion, "title hELLO wORLD").as_deref(), Some("Hello World"));
        assert_eq!(result_of(&CaseConversion, "camel hello world").as_deref(), Some("helloWorld"));
        assert_eq!(result_of(&CaseConversion, "snake helloWorld test").as_deref(), Some("hello_world_test"));
        assert_eq!(result_of(&CaseConversion, "to kebab Hello World").as_deref(), Some("hello-world"));
        assert_eq!(result_of(&CaseConversion, "pascal case hello world").as_deref(), Some("HelloWorld"));
        assert_eq!(result_of(&CaseConversion, "screaming myVar name").as_deref(), Some("MY_VAR_NAME"));
        assert_eq!(CaseConversion.attempt("snake a b").unwrap()[0].label, "snake_case");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(
            result_of(&WordCount, "wc the quick  brown fox").as_deref(),
            Some("4 words, 20 characters, 1 lines")
        );
        assert!(WordCount.attempt("wc").is_none());
    }

    #[test]
    fn test_reverse() {
        assert_eq!(result_of(&Reverse, "reverse hello").as_deref(), Some("olleh"));
        assert_eq!(result_of(&Reverse, "flip añb").as_deref(), Some("bña"));
    }
}
