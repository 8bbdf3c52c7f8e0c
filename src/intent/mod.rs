//! Intent matchers: small grammars that turn free text into instant answers.
//!
//! Every matcher either fully recognizes its grammar and returns at least one
//! smart action, or returns `None` and leaves the query to the others. The
//! chain runs all matchers on every keystroke and concatenates the hits in
//! chain order.

pub mod calc;
pub mod convert;
pub mod generate;
pub mod system;

use crate::action::Action;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref RE_GEN_ONLY: Regex = Regex::new(r"(?i)^gen(?:erate)?$").unwrap();
    static ref RE_GEN_PREFIX: Regex = Regex::new(r"(?i)^gen(?:erate)?\s+").unwrap();
    static ref RE_FIRST_COUNT: Regex = Regex::new(r"\b(\d+)\b").unwrap();
}

/// Upper bound of the "N things" counts (uuids, passwords, paragraphs...)
pub const MAX_COUNT: usize = 10;

/// One grammar of the chain.
pub trait IntentMatcher: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Recognize `query` (already trimmed, non-empty).
    fn attempt(&self, query: &str) -> Option<Vec<Action>>;
}

/// Ordered list of matchers.
pub struct MatcherChain {
    matchers: Vec<Box<dyn IntentMatcher>>,
}

impl MatcherChain {
    pub fn new(matchers: Vec<Box<dyn IntentMatcher>>) -> Self {
        Self { matchers }
    }

    /// The full chain in display order.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(calc::Calculation),
            Box::new(generate::Uuid),
            Box::new(generate::Password),
            Box::new(convert::Timestamp),
            Box::new(convert::NumberBase),
            Box::new(convert::Base64),
            Box::new(convert::UrlCodec),
            Box::new(convert::Color),
            Box::new(convert::Hash),
            Box::new(system::KillProcess),
            Box::new(generate::Lorem),
            Box::new(generate::JsonSample),
            Box::new(system::QrCode),
            Box::new(system::IpAddress),
            Box::new(system::OpenDirectory),
            Box::new(convert::CaseConversion),
            Box::new(convert::WordCount),
            Box::new(generate::RandomNumber),
            Box::new(convert::Reverse),
            Box::new(system::DataConvert),
        ])
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Run every matcher against the trimmed query.
    pub fn smart_actions(&self, query: &str) -> Vec<Action> {
        let q = query.trim();
        if q.is_empty() {
            return Vec::new();
        }

        let mut actions = Vec::new();
        for matcher in &self.matchers {
            if let Some(hits) = matcher.attempt(q) {
                debug!("Intent {} matched with {} action(s)", matcher.name(), hits.len());
                actions.extend(hits);
            }
        }
        actions
    }
}

impl Default for MatcherChain {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Shared grammar helpers
// ============================================================================

/// Two-way prefix test: `"uu"` selects `"uuid"`, and `"uuid 5"` still
/// selects `"uuid"`. Inputs shorter than two characters never match.
pub(crate) fn prefix_of(input: &str, target: &str) -> bool {
    if input.chars().count() < 2 {
        return false;
    }
    target.starts_with(input) || input.starts_with(target)
}

pub(crate) fn starts_with_any(input: &str, targets: &[&str]) -> bool {
    targets.iter().any(|t| prefix_of(input, t))
}

/// `gen` / `generate` alone, or followed by something that prefixes one of
/// `keywords`.
pub(crate) fn matches_gen_prefix(input: &str, keywords: &[&str]) -> bool {
    if RE_GEN_ONLY.is_match(input) {
        return true;
    }
    let after = RE_GEN_PREFIX.replace(input, "");
    if after == input {
        return false;
    }
    keywords.iter().any(|kw| prefix_of(&after, kw))
}

/// First standalone number in the input, clamped to `1..=max`; 1 when absent.
pub(crate) fn parse_count(input: &str, max: usize) -> usize {
    RE_FIRST_COUNT
        .captures(input)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().parse::<usize>().unwrap_or(max).clamp(1, max))
        .unwrap_or(1)
}

/// Truncate to `max` characters with a trailing ellipsis.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// "N things" / "thing" helper for labels.
pub(crate) fn plural(count: usize, singular: &str) -> String {
    if count > 1 {
        format!("{} {}s", count, singular)
    } else {
        format!("{} {}", count, singular)
    }
}
