//! Fuzzy scoring of a query against one candidate string.
//!
//! A subsequence hit earns at most `char_match + word_boundary` (18) for its
//! first character and `char_match + contiguous + word_boundary` (23) for each
//! later one. Queries of up to four characters therefore stay below
//! [`FuzzyWeights::substring_base`] (at most 87), so a contiguous substring
//! hit always outranks them. Longer scattered queries can pass it:
//! `"abcdefghij"` against `"a b c d e f g h i j"` scores 180.

/// Scoring weights for the different kinds of character hits
pub struct FuzzyWeights {
    /// Floor of every substring match
    pub substring_base: f64,
    /// Scaled by query/target length ratio and added to substring matches
    pub substring_span: f64,
    /// Each query character found in order
    pub char_match: u32,
    /// Hit immediately follows the previous hit
    pub contiguous: u32,
    /// Hit starts the target or follows a space or hyphen
    pub word_boundary: u32,
}

impl Default for FuzzyWeights {
    fn default() -> Self {
        Self {
            substring_base: 100.0,
            substring_span: 50.0,
            char_match: 10,
            contiguous: 5,
            word_boundary: 8,
        }
    }
}

/// Score `query` against `target`, case-insensitively.
///
/// Returns 0.0 when the query is not a subsequence of the target. Callers
/// special-case the empty query; an empty query here scores as a substring.
pub fn fuzzy_score(query: &str, target: &str) -> f64 {
    score_with(&FuzzyWeights::default(), query, target)
}

pub fn score_with(weights: &FuzzyWeights, query: &str, target: &str) -> f64 {
    let q: Vec<char> = query.to_lowercase().chars().collect();
    let t: Vec<char> = target.to_lowercase().chars().collect();

    if contains_run(&t, &q) {
        if t.is_empty() {
            return weights.substring_base + weights.substring_span;
        }
        return weights.substring_base + (q.len() as f64 / t.len() as f64) * weights.substring_span;
    }

    let mut qi = 0;
    let mut score: u32 = 0;
    let mut last_match: Option<usize> = None;

    for (i, &c) in t.iter().enumerate() {
        if qi == q.len() {
            break;
        }
        if c != q[qi] {
            continue;
        }
        score += weights.char_match;
        if i > 0 && last_match == Some(i - 1) {
            score += weights.contiguous;
        }
        if i == 0 || t[i - 1] == ' ' || t[i - 1] == '-' {
            score += weights.word_boundary;
        }
        last_match = Some(i);
        qi += 1;
    }

    if qi == q.len() {
        f64::from(score)
    } else {
        0.0
    }
}

fn contains_run(haystack: &[char], needle: &[char]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
