//! Histology extraction by fuzzy phrase matching.
//!
//! Every run of one to three consecutive tokens is matched against the
//! histology vocabulary; the phrase matched by the highest-scoring run wins.

use tracing::trace;

use crate::fields::NOT_REPORTED;
use crate::similarity::{self, SequenceMatcher};
use crate::vocabulary::HistologyVocabulary;

/// Minimum similarity ratio for a run to match a phrase.
pub const DEFAULT_SIMILARITY_CUTOFF: f64 = 0.6;

/// Longest token run considered; matches the default phrase word limit.
const MAX_WINDOW: usize = 3;

/// Candidate phrases from `tokens`: at each start, the one, two and three token runs.
pub fn candidate_windows<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut candidates = Vec::with_capacity(tokens.len() * MAX_WINDOW);
    for start in 0..tokens.len() {
        for len in 1..=MAX_WINDOW {
            let Some(window) = tokens.get(start..start + len) else { break };
            let joined = window.iter().map(AsRef::<str>::as_ref).collect::<Vec<&str>>().join(" ");
            candidates.push(joined);
        }
    }
    candidates
}

/// Extract the histologic type with the default cutoff.
pub fn extract_histology<S: AsRef<str>>(tokens: &[S], vocab: &HistologyVocabulary) -> String {
    extract_histology_with_cutoff(tokens, vocab, DEFAULT_SIMILARITY_CUTOFF)
}

/// Extract the histologic type, requiring a similarity of at least `cutoff`.
///
/// Ties keep the earliest candidate, so shorter runs win at the same start.
pub fn extract_histology_with_cutoff<S: AsRef<str>>(
    tokens: &[S],
    vocab: &HistologyVocabulary,
    cutoff: f64,
) -> String {
    let mut best: Option<(f64, &str)> = None;

    for candidate in candidate_windows(tokens) {
        let (score, phrase) = match similarity::best_close_match(&candidate, vocab.phrases(), cutoff) {
            Some(phrase) => (SequenceMatcher::new(&candidate, phrase).ratio(), phrase),
            None => (0.0, NOT_REPORTED),
        };

        if best.map_or(true, |(top, _)| score > top) {
            trace!("Histology candidate {:?} -> {:?} ({:.3})", candidate, phrase, score);
            best = Some((score, phrase));
        }
    }

    best.map_or_else(|| NOT_REPORTED.to_string(), |(_, phrase)| phrase.to_string())
}
