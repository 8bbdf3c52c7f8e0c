use crate::action::{Action, Section};
use crate::scorer::fuzzy_score;

/// Label hits count double so title matches beat incidental keyword hits.
const LABEL_WEIGHT: f64 = 2.0;

/// Baseline given to every action when the query is empty.
const EMPTY_QUERY_SCORE: f64 = 1.0;

/// Composite score of one action: the best of label (weighted), description
/// and any keyword.
pub fn score_action(action: &Action, query: &str) -> f64 {
    if query.is_empty() {
        return EMPTY_QUERY_SCORE;
    }

    let label = fuzzy_score(query, &action.label) * LABEL_WEIGHT;
    let description = fuzzy_score(query, &action.description);
    let keyword = action
        .keywords
        .iter()
        .map(|kw| fuzzy_score(query, kw))
        .fold(0.0, f64::max);

    label.max(description).max(keyword)
}

/// Filter, rank and group a candidate snapshot.
///
/// Non-matching actions are dropped, the rest are stably sorted by descending
/// score and grouped by section in order of first appearance. An empty query
/// keeps the candidate order.
pub fn filter_actions(actions: &[Action], query: &str) -> Vec<Section> {
    let mut scored: Vec<(&Action, f64)> = actions
        .iter()
        .map(|action| (action, score_action(action, query)))
        .filter(|(_, score)| *score > 0.0)
        .collect();

    // sort_by is stable: ties keep candidate order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut sections: Vec<Section> = Vec::new();
    for (action, _) in scored {
        match sections.iter_mut().find(|s| s.title == action.section) {
            Some(section) => section.actions.push(action.clone()),
            None => sections.push(Section {
                title: action.section.clone(),
                actions: vec![action.clone()],
            }),
        }
    }

    sections
}
