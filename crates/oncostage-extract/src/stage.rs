//! Stage group extraction.
//!
//! Two passes: a value following a stage indicator ("stage IIIA1"), otherwise
//! any token that is itself a valid stage group. The result's leading digit is
//! rewritten as a roman numeral.

use tracing::trace;

use crate::fields::NOT_REPORTED;
use crate::vocabulary::StageVocabulary;

/// Extract the stage group from note tokens.
pub fn extract_stage<S: AsRef<str>>(tokens: &[S], vocab: &StageVocabulary) -> String {
    let stage = find_indicated_stage(tokens, vocab).or_else(|| find_listed_stage(tokens, vocab));

    match stage {
        Some(stage) => canonicalize_stage(&stage),
        None => NOT_REPORTED.to_string(),
    }
}

/// Token following the last stage indicator whose value starts like a stage.
fn find_indicated_stage<S: AsRef<str>>(tokens: &[S], vocab: &StageVocabulary) -> Option<String> {
    let mut stage = None;
    for pair in tokens.windows(2) {
        if !vocab.is_indicator(&pair[0].as_ref().to_lowercase()) {
            continue;
        }
        let candidate = pair[1].as_ref().to_uppercase();
        if vocab.has_stage_prefix(&candidate) {
            trace!("Stage indicator {:?} -> {:?}", pair[0].as_ref(), candidate);
            stage = Some(candidate);
        }
    }
    stage
}

/// Longest token that is a stage group; ties go to the group generated first.
fn find_listed_stage<S: AsRef<str>>(tokens: &[S], vocab: &StageVocabulary) -> Option<String> {
    tokens
        .iter()
        .filter_map(|token| {
            let upper = token.as_ref().to_uppercase();
            vocab.position(&upper).map(|pos| (upper, pos))
        })
        .min_by(|(a, pa), (b, pb)| b.len().cmp(&a.len()).then(pa.cmp(pb)))
        .map(|(group, _)| group)
}

/// Replace a leading `1`-`4` with `I`-`IV`. Anything else is returned unchanged.
pub fn canonicalize_stage(stage: &str) -> String {
    let mut chars = stage.chars();
    let roman = match chars.next() {
        Some('1') => "I",
        Some('2') => "II",
        Some('3') => "III",
        Some('4') => "IV",
        _ => return stage.to_string(),
    };
    format!("{}{}", roman, chars.as_str())
}
