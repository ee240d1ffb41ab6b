//! TNM code extraction.
//!
//! A token contributes codes only when it is made up entirely of codes, so
//! `N0T2a` yields `N0` and `T2a` while `tissue` does not yield `Tis`.

use tracing::trace;

use crate::fields::{TnmCategory, TnmStaging};
use crate::vocabulary::TnmVocabulary;

/// Extract T, N and M codes from note tokens. Later tokens overwrite earlier ones.
pub fn extract_tnm<S: AsRef<str>>(tokens: &[S], vocab: &TnmVocabulary) -> TnmStaging {
    let mut staging = TnmStaging::default();

    for token in tokens {
        let word = token.as_ref().to_lowercase();
        let mut remaining = word.clone();
        let mut found: Vec<(TnmCategory, &str)> = Vec::with_capacity(TnmCategory::ALL.len());

        for category in TnmCategory::ALL {
            if let Some((code, lowered)) = vocab.codes(category).longest_in(&word) {
                remaining = remaining.replace(lowered, "");
                found.push((category, code));
            }
        }

        if found.is_empty() {
            continue;
        }
        if !remaining.is_empty() {
            trace!("Rejected TNM token {:?}, residue {:?}", word, remaining);
            continue;
        }
        for (category, code) in found {
            staging.set(category, code);
        }
    }

    staging
}
