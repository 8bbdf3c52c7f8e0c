//! Generator intents: uuids, passwords, placeholder text, sample JSON and
//! random values. Randomness that ends up in a secret or identifier comes
//! from the OS generator.

use super::{matches_gen_prefix, parse_count, plural, prefix_of, starts_with_any, truncate, IntentMatcher, MAX_COUNT};
use crate::action::Action;
use chrono::{SecondsFormat, Utc};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use regex::Regex;
use serde_json::json;

lazy_static! {
    static ref RE_COUNT_UUID: Regex = Regex::new(r"(?i)^\d+\s+uuid").unwrap();
    static ref RE_GEN_COUNT_UUID: Regex = Regex::new(r"(?i)^gen(?:erate)?\s+\d+\s+uuid").unwrap();
    static ref RE_PW: Regex = Regex::new(r"(?i)^pw\b").unwrap();
    static ref RE_PW_LENGTH: Regex = Regex::new(r"\b(\d{1,3})\b").unwrap();
    static ref RE_PW_COUNT: Regex = Regex::new(r"^(?:gen(?:erate)?\s+)?(\d+)\s+").unwrap();
    static ref RE_COUNTED_PW: Regex = Regex::new(r"^(?:gen(?:erate)?\s+)?\d+\s+(?:pass|pw)").unwrap();
    static ref RE_ANY_NUMBER: Regex = Regex::new(r"(\d+)").unwrap();
    static ref RE_WORD_MODE: Regex = Regex::new(r"(?i)word").unwrap();
    static ref RE_SENTENCE_MODE: Regex = Regex::new(r"(?i)sent").unwrap();
    static ref RE_RAND_RANGE: Regex = Regex::new(r"(?i)^(?:rand(?:om)?(?:\s+number)?)\s+(\d+)\s+(\d+)").unwrap();
    static ref RE_RAND_BARE: Regex = Regex::new(r"(?i)^rand(om)?(\s+number)?$").unwrap();
    static ref RE_RAND_COLOR: Regex = Regex::new(r"(?i)^rand(?:om)?\s+color$").unwrap();
}

// ============================================================================
// UUID
// ============================================================================

const UUID_WORDS: &[&str] = &["uuid", "uid", "guid"];

pub struct Uuid;

impl IntentMatcher for Uuid {
    fn name(&self) -> &'static str {
        "uuid"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let ql = query.trim().to_lowercase();

        let recognized = starts_with_any(&ql, UUID_WORDS)
            || RE_COUNT_UUID.is_match(&ql)
            || matches_gen_prefix(&ql, UUID_WORDS)
            || RE_GEN_COUNT_UUID.is_match(&ql);
        if !recognized {
            return None;
        }

        let count = parse_count(&ql, MAX_COUNT);
        let uuids: Vec<String> = (0..count).map(|_| uuid::Uuid::new_v4().to_string()).collect();

        let (label, description) = if count > 1 {
            (format!("Generate {} UUIDs", count), format!("{} + {} more", uuids[0], count - 1))
        } else {
            ("Generate UUID".to_string(), uuids[0].clone())
        };

        Some(vec![Action::smart_copy("smart-uuid", label, description, "Fingerprint", uuids.join("\n"))])
    }
}

// ============================================================================
// Password
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charset {
    All,
    Strong,
    Number,
    Alpha,
    AlphaNumeric,
    Simple,
}

impl Charset {
    fn chars(&self) -> &'static [u8] {
        match self {
            Charset::All => b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=",
            Charset::Strong => {
                b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=[]{}|;:,.<>?"
            }
            Charset::Number => b"0123456789",
            Charset::Alpha => b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz",
            Charset::AlphaNumeric => b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789",
            Charset::Simple => b"abcdefghijklmnopqrstuvwxyz0123456789",
        }
    }
}

/// Modifier words in priority order; the first word of each names the label.
const PW_MODIFIERS: &[(&[&str], Charset)] = &[
    (&["strong", "secure"], Charset::Strong),
    (&["number", "numeric", "digit", "pin"], Charset::Number),
    (&["alpha"], Charset::Alpha),
    (&["alphanum"], Charset::AlphaNumeric),
    (&["simple", "easy"], Charset::Simple),
];

const PW_DEFAULT_LENGTH: usize = 20;
const PW_STRONG_LENGTH: usize = 32;
const PW_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=128;

pub struct Password;

impl Password {
    fn modifier_words() -> impl Iterator<Item = &'static str> {
        PW_MODIFIERS.iter().flat_map(|(words, _)| words.iter().copied())
    }
}

impl IntentMatcher for Password {
    fn name(&self) -> &'static str {
        "password"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let ql = query.trim().to_lowercase();
        let words: Vec<&str> = ql.split_whitespace().collect();
        let modifiers: Vec<&str> = Self::modifier_words().collect();

        let direct = starts_with_any(&ql, &["pass", "password", "passwd"])
            || RE_PW.is_match(&ql)
            || RE_COUNTED_PW.is_match(&ql);
        let gen_password = matches_gen_prefix(&ql, &["pass", "password", "pw"]);
        let gen_modifier = matches_gen_prefix(&ql, &modifiers);
        let modifier_alone = modifiers
            .iter()
            .any(|m| prefix_of(words.first().copied().unwrap_or(""), m));

        if !direct && !gen_password && !gen_modifier && !modifier_alone {
            return None;
        }

        let mut charset = Charset::All;
        let mut length = PW_DEFAULT_LENGTH;
        let mut type_label = String::new();

        for (prefixes, set) in PW_MODIFIERS {
            let hit = prefixes
                .iter()
                .any(|p| ql.contains(p) || words.iter().any(|w| prefix_of(w, p)));
            if hit {
                charset = *set;
                if charset == Charset::Strong {
                    length = PW_STRONG_LENGTH;
                }
                type_label = format!("{} ", capitalize(prefixes[0]));
                break;
            }
        }

        if let Some(n) = RE_PW_LENGTH
            .captures(&ql)
            .and_then(|c| c[1].parse::<usize>().ok())
        {
            if PW_LENGTH_RANGE.contains(&n) {
                length = n;
            }
        }

        let count = RE_PW_COUNT
            .captures(&ql)
            .and_then(|c| c[1].parse::<usize>().ok())
            .filter(|n| (1..=MAX_COUNT).contains(n))
            .unwrap_or(1);

        let passwords: Vec<String> = (0..count).map(|_| generate_password(length, charset)).collect();

        let (label, description) = if count > 1 {
            (
                format!("Generate {} {}passwords", count, type_label),
                format!("{} + {} more · {} chars", passwords[0], count - 1, length),
            )
        } else {
            (
                format!("Generate {}password", type_label),
                format!("{} · {} chars", passwords[0], length),
            )
        };

        Some(vec![Action::smart_copy("smart-password", label, description, "Lock", passwords.join("\n"))])
    }
}

fn generate_password(length: usize, charset: Charset) -> String {
    let chars = charset.chars();
    (0..length)
        .map(|_| chars[OsRng.next_u32() as usize % chars.len()] as char)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Lorem ipsum
// ============================================================================

const LOREM_WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do", "eiusmod",
    "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim", "ad", "minim",
    "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi", "aliquip", "ex", "ea",
    "commodo", "consequat", "duis", "aute", "irure", "in", "reprehenderit", "voluptate", "velit", "esse",
    "cillum", "fugiat", "nulla", "pariatur", "excepteur", "sint", "occaecat", "cupidatat", "non",
    "proident", "sunt", "culpa", "qui", "officia", "deserunt", "mollit", "anim", "id", "est", "laborum",
];

const HIPSTER_WORDS: &[&str] = &[
    "artisan", "kombucha", "vinyl", "cardigan", "skateboard", "ethical", "organic", "craft", "beer",
    "selvage", "tattooed", "fixie", "portland", "brunch", "gastropub", "dreamcatcher", "aesthetic",
    "kickstarter", "vaporware", "normcore", "pitchfork", "flannel", "retro", "kale", "chips",
    "succulents", "hashtag", "tofu",
];

const TECH_WORDS: &[&str] = &[
    "algorithm", "API", "backend", "blockchain", "cache", "cloud", "compiler", "container", "database",
    "deploy", "devops", "docker", "endpoint", "framework", "frontend", "function", "GraphQL", "HTTP",
    "kubernetes", "lambda", "library", "microservice", "middleware", "module", "pipeline", "promise",
    "proxy", "React", "Redis", "refactor", "repository", "REST", "runtime", "schema", "server",
    "serverless", "socket", "SQL", "typescript", "webhook", "websocket",
];

/// Alternative corpora selected by keyword; plain lorem is the default.
const CORPORA: &[(&str, &[&str])] = &[("hipster", HIPSTER_WORDS), ("tech", TECH_WORDS)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoremUnit {
    Word,
    Sentence,
    Paragraph,
}

pub struct Lorem;

impl IntentMatcher for Lorem {
    fn name(&self) -> &'static str {
        "lorem"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let ql = query.trim().to_lowercase();
        if !starts_with_any(&ql, &["lorem"]) && !matches_gen_prefix(&ql, &["lorem"]) {
            return None;
        }

        let count = RE_ANY_NUMBER
            .captures(&ql)
            .map(|c| c[1].parse::<usize>().unwrap_or(MAX_COUNT).clamp(1, MAX_COUNT))
            .unwrap_or(1);

        let (words, corpus_label) = CORPORA
            .iter()
            .find(|(key, _)| ql.contains(key))
            .map(|(key, words)| (*words, format!(" ({})", key)))
            .unwrap_or((LOREM_WORDS, String::new()));

        let unit = if RE_WORD_MODE.is_match(&ql) {
            LoremUnit::Word
        } else if RE_SENTENCE_MODE.is_match(&ql) {
            LoremUnit::Sentence
        } else {
            LoremUnit::Paragraph
        };

        let (result, summary) = match unit {
            LoremUnit::Word => (random_words(count, words), format!("{} words", count)),
            LoremUnit::Sentence => (
                (0..count).map(|_| sentence(words)).collect::<Vec<_>>().join(" "),
                plural(count, "sentence"),
            ),
            LoremUnit::Paragraph => (
                (0..count).map(|_| paragraph(words)).collect::<Vec<_>>().join("\n\n"),
                plural(count, "paragraph"),
            ),
        };

        let description = format!("{}{} · {}", summary, corpus_label, truncate(&result, 50));
        Some(vec![Action::smart_copy("smart-lorem", "Lorem Ipsum".to_string(), description, "TextCursorInput", result)])
    }
}

fn random_words(count: usize, words: &[&str]) -> String {
    (0..count)
        .map(|_| words[OsRng.next_u32() as usize % words.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn sentence(words: &[&str]) -> String {
    let length = rand::thread_rng().gen_range(8..16);
    format!("{}.", capitalize(&random_words(length, words)))
}

fn paragraph(words: &[&str]) -> String {
    let sentences = rand::thread_rng().gen_range(4..7);
    (0..sentences).map(|_| sentence(words)).collect::<Vec<_>>().join(" ")
}

// ============================================================================
// JSON sample
// ============================================================================

pub struct JsonSample;

impl IntentMatcher for JsonSample {
    fn name(&self) -> &'static str {
        "json-sample"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let ql = query.trim().to_lowercase();
        if !starts_with_any(&ql, &["json"]) && !matches_gen_prefix(&ql, &["json"]) {
            return None;
        }

        let count = parse_count(&ql, MAX_COUNT);
        let samples: Vec<serde_json::Value> = (0..count).map(|_| sample_object()).collect();

        let result = if count == 1 {
            serde_json::to_string_pretty(&samples[0]).ok()?
        } else {
            serde_json::to_string_pretty(&samples).ok()?
        };

        let label = if count > 1 {
            format!("Generate {} JSON objects", count)
        } else {
            "Generate JSON".to_string()
        };
        let first_line = result.lines().next().unwrap_or_default();
        let description = if result.contains('\n') {
            format!("{} ...", first_line)
        } else {
            first_line.to_string()
        };

        Some(vec![Action::smart_copy("smart-json", label, description, "Braces", result)])
    }
}

fn sample_object() -> serde_json::Value {
    let mut rng = rand::thread_rng();
    let id: u32 = rng.gen_range(0..10_000);
    let value = (rng.gen::<f64>() * 100.0 * 100.0).round() / 100.0;
    json!({
        "id": id,
        "name": format!("item_{}", id),
        "active": rng.gen::<f64>() > 0.3,
        "value": value,
        "created": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

// ============================================================================
// Random number / color
// ============================================================================

const BARE_RANDOM_CEILING: u64 = 1_000_000;

pub struct RandomNumber;

impl IntentMatcher for RandomNumber {
    fn name(&self) -> &'static str {
        "random"
    }

    fn attempt(&self, query: &str) -> Option<Vec<Action>> {
        let ql = query.trim().to_lowercase();

        if let Some(c) = RE_RAND_RANGE.captures(&ql) {
            let min: u64 = c[1].parse().ok()?;
            let max: u64 = c[2].parse().ok()?;
            if min >= max {
                return None;
            }
            // modulo bias accepted
            let span = (max - min).checked_add(1)?;
            let value = min + OsRng.next_u64() % span;
            return Some(vec![Action::smart_copy(
                "smart-rand",
                format!("Random: {}", value),
                format!("Random number between {} and {}", min, max),
                "Dice5",
                value.to_string(),
            )]);
        }

        if RE_RAND_BARE.is_match(&ql) {
            let value = OsRng.next_u64() % BARE_RANDOM_CEILING;
            return Some(vec![Action::smart_copy(
                "smart-rand",
                format!("Random: {}", value),
                "Random number (0-999999)".to_string(),
                "Dice5",
                value.to_string(),
            )]);
        }

        if RE_RAND_COLOR.is_match(&ql) {
            let mut rgb = [0u8; 3];
            OsRng.fill_bytes(&mut rgb);
            let hex = format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2]);
            return Some(vec![Action::smart_copy(
                "smart-rand-color",
                format!("Random Color: {}", hex),
                format!("rgb({}, {}, {})", rgb[0], rgb[1], rgb[2]),
                "Palette",
                hex,
            )]);
        }

        None
    }
}
