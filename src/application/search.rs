//! # Keyword Search
//!
//! Fuzzy matching of a search term against episode titles and show notes.
//! Exact substring hits rank first; otherwise the best `strsim` similarity
//! of the term against the title or any word window of the notes decides.

use crate::domain::markup::strip_html;
use crate::domain::types::{Episode, FeedSnapshot};

/// Number of hits returned to the chat.
pub const MAX_HITS: usize = 3;

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

/// Similarity of `term` (already normalized) to one episode, in `0.0..=1.0`.
fn score(term: &str, episode: &Episode) -> f64 {
    let title = normalize(&episode.title);
    let notes = normalize(&strip_html(&episode.content));
    let words: Vec<&str> = title.split_whitespace().chain(notes.split_whitespace()).collect();
    if words.join(" ").contains(term) {
        return 1.0;
    }

    let mut best = strsim::normalized_levenshtein(term, title.trim());
    let term_words = term.split_whitespace().count().max(1);
    for window in words.windows(term_words.min(words.len().max(1))) {
        best = best.max(strsim::jaro_winkler(term, &window.join(" ")));
    }
    best
}

/// Titles of the best matching episodes, best first. Ties keep feed order.
pub fn fuzzy_topic_search(snapshot: &FeedSnapshot, term: &str) -> Vec<String> {
    let term = normalize(term);
    let term = term.split_whitespace().collect::<Vec<_>>().join(" ");
    if term.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &Episode)> = snapshot
        .episodes
        .iter()
        .map(|episode| (score(&term, episode), episode))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .take(MAX_HITS)
        .map(|(_, episode)| episode.title.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{episode, snapshot};

    fn feed() -> FeedSnapshot {
        let mut episodes = vec![
            episode("Mi300: Schwarze Löcher", "Mon, 01 Jan 2024 10:00:00 +0000"),
            episode("Mi299: Kekse im Weltall", "Mon, 01 Jan 2024 10:00:00 +0000"),
            episode("Mi298: Krähen zählen", "Mon, 01 Jan 2024 10:00:00 +0000"),
            episode("Mi297: Bier und Schaum", "Mon, 01 Jan 2024 10:00:00 +0000"),
        ];
        episodes[3].content = "<p><strong>Thema 1:</strong> Warum Bierschaum zerfällt</p>".to_string();
        episodes[2].content = "<p>Raben und Krähen können zählen</p>".to_string();
        snapshot("Methodisch inkorrekt!", episodes)
    }

    #[test]
    fn exact_hits_rank_first() {
        let hits = fuzzy_topic_search(&feed(), "bierschaum");
        assert_eq!(hits.len(), MAX_HITS);
        assert_eq!(hits[0], "Mi297: Bier und Schaum");
    }

    #[test]
    fn typos_still_match() {
        let hits = fuzzy_topic_search(&feed(), "Krahen");
        assert_eq!(hits[0], "Mi298: Krähen zählen");

        let hits = fuzzy_topic_search(&feed(), "schwarze loecher");
        assert_eq!(hits[0], "Mi300: Schwarze Löcher");
    }

    #[test]
    fn phrases_span_title_and_notes() {
        let mut feed = feed();
        feed.episodes.push(episode("Mi296: Dunkle", "Mon, 01 Jan 2024 10:00:00 +0000"));
        feed.episodes[4].content = "<p>Materie im Keller</p>".to_string();

        let hits = fuzzy_topic_search(&feed, "dunkle materie");
        assert_eq!(hits[0], "Mi296: Dunkle");
    }

    #[test]
    fn empty_term_finds_nothing() {
        assert!(fuzzy_topic_search(&feed(), "  ").is_empty());
    }
}
