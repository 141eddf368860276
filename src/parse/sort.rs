//! Ordering and deduplication of the final score list.
//!
//! The order is a total-order chain of tie-breaks: urtext editions first,
//! then publisher name, then "real" titles before generic "Complete Score"
//! ones, then title. The underlying sort is stable, so equal keys keep
//! their document order across runs.

use crate::model::ScoreEntry;
use std::cmp::Ordering;
use std::collections::HashSet;

pub fn sort_scores(entries: &mut [ScoreEntry]) {
    entries.sort_by(compare_scores);
}

fn compare_scores(a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
    b.is_urtext
        .cmp(&a.is_urtext)
        .then_with(|| fold(&a.publisher.name).cmp(&fold(&b.publisher.name)))
        .then_with(|| is_generic_title(&a.title).cmp(&is_generic_title(&b.title)))
        .then_with(|| fold(&a.title).cmp(&fold(&b.title)))
}

// Case-insensitive comparison key via Unicode lowercasing, standing in for
// a locale-collated compare.
fn fold(s: &str) -> String {
    s.to_lowercase()
}

fn is_generic_title(title: &str) -> bool {
    fold(title).contains("complete score")
}

/// Drop entries whose file id was already seen, keeping the first (i.e. the
/// best-ranked after sorting).
pub fn dedup_scores(entries: Vec<ScoreEntry>) -> Vec<ScoreEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id.clone()))
        .collect()
}
