//! Reference vocabularies for staging extraction.
//!
//! - TNM codes: fixed lists per category
//! - Stage groups: generated from stage numbers and sub-categories
//! - Histology phrases: loaded from a CSV of site/histology descriptions
//!
//! All vocabularies are built once and never mutated; extractors take them by reference.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use aho_corasick::{AhoCorasick, MatchKind};
use oncostage_common::{OncostageError, Result};
use tracing::{debug, info};

use crate::fields::TnmCategory;

pub const T_CODES: &[&str] = &[
    "TX", "Tis", "T1", "T1mi", "T1a", "T1b", "T1c", "T2", "T2a", "T2b", "T3", "T4",
];
pub const N_CODES: &[&str] = &["Nx", "N0", "N1", "N2", "N3"];
pub const M_CODES: &[&str] = &["Mx", "M0", "M1", "M1a", "M1b", "M1c"];

pub const STAGE_INDICATORS: &[&str] = &["stage", "stg", "stge"];
pub const STAGE_NUMBERS: &[&str] = &["I", "II", "III", "IV", "1", "2", "3", "4"];
pub const STAGE_SUBCATEGORIES: &[&str] = &["A", "B", "C"];
pub const STAGE_SUBSUBCATEGORIES: &[&str] = &["1", "2", "3"];
const STAGE_ZERO_GROUPS: &[&str] = &["0", "0a", "0is"];

pub const SITE_COLUMN: &str = "Site Description";
pub const HISTOLOGY_COLUMN: &str = "Histology Description";
pub const BEHAVIOR_COLUMN: &str = "Histology/Behavior Description";
pub const DEFAULT_MAX_WORDS: usize = 3;

// ─────────────────────────────────────────────────────────────────────────────
// TNM

/// Codes for one TNM category with a substring automaton over their lowercase forms.
#[derive(Debug, Clone)]
pub struct CodeSet {
    codes: Vec<String>,
    lowered: Vec<String>,
    automaton: AhoCorasick,
}

impl CodeSet {
    pub fn new<S: AsRef<str>>(codes: &[S]) -> Result<Self> {
        let codes: Vec<String> = codes.iter().map(|c| c.as_ref().to_string()).collect();
        let lowered: Vec<String> = codes.iter().map(|c| c.to_lowercase()).collect();

        // Standard semantics so overlapping search reports every code present
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&lowered)
            .map_err(|e| OncostageError::InvalidParameter(format!("TNM code automaton: {}", e)))?;

        Ok(Self { codes, lowered, automaton })
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Longest code occurring in the lowercase `word`; ties go to the earlier code.
    ///
    /// Returns the code as listed together with its lowercase form.
    pub fn longest_in(&self, word: &str) -> Option<(&str, &str)> {
        let mut best: Option<usize> = None;
        for mat in self.automaton.find_overlapping_iter(word) {
            let idx = mat.pattern().as_usize();
            best = match best {
                Some(b) if self.lowered[b].len() > self.lowered[idx].len() => Some(b),
                Some(b) if self.lowered[b].len() == self.lowered[idx].len() && b < idx => Some(b),
                _ => Some(idx),
            };
        }
        best.map(|idx| (self.codes[idx].as_str(), self.lowered[idx].as_str()))
    }
}

/// Valid T, N and M codes.
#[derive(Debug, Clone)]
pub struct TnmVocabulary {
    t: CodeSet,
    n: CodeSet,
    m: CodeSet,
}

impl TnmVocabulary {
    pub fn new<S: AsRef<str>>(t: &[S], n: &[S], m: &[S]) -> Result<Self> {
        Ok(Self {
            t: CodeSet::new(t)?,
            n: CodeSet::new(n)?,
            m: CodeSet::new(m)?,
        })
    }

    /// AJCC codes recognized in notes.
    pub fn standard() -> Self {
        Self::new(T_CODES, N_CODES, M_CODES)
            .expect("Failed to build automaton from embedded TNM codes")
    }

    pub fn codes(&self, category: TnmCategory) -> &CodeSet {
        match category {
            TnmCategory::T => &self.t,
            TnmCategory::N => &self.n,
            TnmCategory::M => &self.m,
        }
    }
}

impl Default for TnmVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stage groups

/// Valid stage-group strings plus the words that introduce a stage.
#[derive(Debug, Clone)]
pub struct StageVocabulary {
    groups: Vec<String>,
    /// group -> position in `groups`
    positions: AHashMap<String, usize>,
    indicators: Vec<String>,
    prefixes: Vec<String>,
}

impl StageVocabulary {
    pub fn standard() -> Self {
        let mut groups: Vec<String> = STAGE_ZERO_GROUPS.iter().map(|s| s.to_string()).collect();
        groups.extend(STAGE_NUMBERS.iter().map(|s| s.to_string()));
        // Triples precede pairs; equal-length fallback ties resolve on this order.
        for num in STAGE_NUMBERS {
            for sub in STAGE_SUBCATEGORIES {
                for subsub in STAGE_SUBSUBCATEGORIES {
                    groups.push(format!("{num}{sub}{subsub}"));
                }
            }
        }
        for num in STAGE_NUMBERS {
            for sub in STAGE_SUBCATEGORIES {
                groups.push(format!("{num}{sub}"));
            }
        }
        let groups: Vec<String> = groups.into_iter().map(|g| g.to_uppercase()).collect();

        let mut positions = AHashMap::with_capacity(groups.len());
        for (idx, group) in groups.iter().enumerate() {
            positions.entry(group.clone()).or_insert(idx);
        }

        let mut prefixes: Vec<String> = STAGE_NUMBERS.iter().map(|s| s.to_string()).collect();
        prefixes.push("0".to_string());

        Self {
            groups,
            positions,
            indicators: STAGE_INDICATORS.iter().map(|s| s.to_string()).collect(),
            prefixes,
        }
    }

    /// All stage groups, uppercase, in generation order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Generation-order position of an uppercase stage group.
    pub fn position(&self, group: &str) -> Option<usize> {
        self.positions.get(group).copied()
    }

    /// Whether a lowercase word announces a stage.
    pub fn is_indicator(&self, word: &str) -> bool {
        self.indicators.iter().any(|i| i == word)
    }

    /// Whether an uppercase candidate begins with a stage number or `0`.
    pub fn has_stage_prefix(&self, candidate: &str) -> bool {
        self.prefixes.iter().any(|p| candidate.starts_with(p.as_str()))
    }
}

impl Default for StageVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Histology

/// Lowercase histology phrases in load order.
#[derive(Debug, Clone, Default)]
pub struct HistologyVocabulary {
    phrases: Vec<String>,
}

impl HistologyVocabulary {
    /// Use `phrases` as given.
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }

    /// Load phrases from a histology CSV on disk.
    pub fn load(path: impl AsRef<Path>, max_words: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| OncostageError::unavailable(path, e))?;
        let vocab = Self::from_reader(BufReader::new(file), max_words)?;
        info!("Loaded {} histology phrases from {:?}", vocab.len(), path);
        Ok(vocab)
    }

    /// Read phrases from CSV with a header row.
    ///
    /// The site, histology and histology/behavior columns are each lowercased with
    /// commas removed, then concatenated in that order with duplicates dropped.
    /// Phrases longer than `max_words` words are discarded.
    pub fn from_reader<R: Read>(reader: R, max_words: usize) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let col_idx = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| OncostageError::MalformedTable(format!("missing column {:?}", name)))
        };
        let columns = [
            col_idx(SITE_COLUMN)?,
            col_idx(HISTOLOGY_COLUMN)?,
            col_idx(BEHAVIOR_COLUMN)?,
        ];

        let records = csv_reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

        let mut seen = AHashSet::new();
        let mut phrases = Vec::new();
        let mut too_long = 0usize;

        for column in columns {
            for record in &records {
                let Some(raw) = record.get(column) else { continue };
                if raw.is_empty() {
                    continue;
                }
                let phrase = raw.to_lowercase().replace(',', "");
                if phrase.trim().is_empty() || !seen.insert(phrase.clone()) {
                    continue;
                }
                if phrase.split_whitespace().count() > max_words {
                    too_long += 1;
                    continue;
                }
                phrases.push(phrase);
            }
        }

        debug!(
            "Histology vocabulary: {} rows, {} phrases kept, {} over {} words dropped",
            records.len(),
            phrases.len(),
            too_long,
            max_words
        );

        Ok(Self { phrases })
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Load histology phrases of at most `max_word_length` words.
pub fn load_histological_phrases(
    path: impl AsRef<Path>,
    max_word_length: usize,
) -> Result<HistologyVocabulary> {
    HistologyVocabulary::load(path, max_word_length)
}

/// The three vocabularies the extractors need.
#[derive(Debug, Clone)]
pub struct Vocabularies {
    pub tnm: TnmVocabulary,
    pub stage: StageVocabulary,
    pub histology: HistologyVocabulary,
}

impl Vocabularies {
    pub fn new(histology: HistologyVocabulary) -> Self {
        Self {
            tnm: TnmVocabulary::standard(),
            stage: StageVocabulary::standard(),
            histology,
        }
    }

    /// Standard TNM and stage vocabularies with histology phrases from `path`.
    pub fn load(histology_path: impl AsRef<Path>, max_words: usize) -> Result<Self> {
        Ok(Self::new(load_histological_phrases(histology_path, max_words)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Site Description,Histology Description,Histology/Behavior Description
\"Lung, NOS\",Adenocarcinoma,\"Adenocarcinoma, NOS\"
Lymph Nodes,Hodgkin Lymphoma,Hodgkin lymphoma
Lung,Squamous cell carcinoma keratinizing type,adenocarcinoma
";

    #[test]
    fn test_stage_groups_generation_order() {
        let vocab = StageVocabulary::standard();
        let groups = vocab.groups();
        assert_eq!(groups.len(), 3 + 8 + 8 * 3 + 8 * 3 * 3);
        assert_eq!(&groups[..4], &["0", "0A", "0IS", "I"]);
        assert_eq!(groups[11], "IA1");
        assert_eq!(groups[11 + 8 * 3 * 3], "IA");
        assert_eq!(groups.last().map(String::as_str), Some("4C"));
        assert!(vocab.position("IIIA1").is_some());
        assert!(vocab.position("IIA1").unwrap() < vocab.position("IIA").unwrap());
        assert!(vocab.position("IIA1").unwrap() < vocab.position("IIIA").unwrap());
        assert_eq!(vocab.position("V"), None);
    }

    #[test]
    fn test_stage_indicators_and_prefixes() {
        let vocab = StageVocabulary::standard();
        assert!(vocab.is_indicator("stg"));
        assert!(!vocab.is_indicator("grade"));
        assert!(vocab.has_stage_prefix("0IS"));
        assert!(vocab.has_stage_prefix("IVB"));
        assert!(!vocab.has_stage_prefix("GROUPING"));
    }

    #[test]
    fn test_code_set_longest_match() {
        let vocab = TnmVocabulary::standard();
        let t = vocab.codes(TnmCategory::T);
        assert_eq!(t.longest_in("t1mi"), Some(("T1mi", "t1mi")));
        assert_eq!(t.longest_in("t2"), Some(("T2", "t2")));
        // equal-length codes resolve to the earlier one listed
        assert_eq!(t.longest_in("t1bt1a"), Some(("T1a", "t1a")));
        assert_eq!(t.longest_in("n0"), None);
        assert_eq!(vocab.codes(TnmCategory::N).codes().len(), 5);
    }

    #[test]
    fn test_histology_from_reader() {
        let vocab = HistologyVocabulary::from_reader(CSV.as_bytes(), 3).unwrap();
        assert_eq!(
            vocab.phrases(),
            &[
                "lung nos",
                "lymph nodes",
                "lung",
                "adenocarcinoma",
                "hodgkin lymphoma",
                "adenocarcinoma nos",
            ]
        );
    }

    #[test]
    fn test_histology_word_limit() {
        let vocab = HistologyVocabulary::from_reader(CSV.as_bytes(), 1).unwrap();
        assert_eq!(vocab.phrases(), &["lung", "adenocarcinoma"]);

        let vocab = HistologyVocabulary::from_reader(CSV.as_bytes(), 5).unwrap();
        assert!(vocab
            .phrases()
            .iter()
            .any(|p| p == "squamous cell carcinoma keratinizing type"));
    }

    #[test]
    fn test_histology_missing_column() {
        let csv = "Site Description,Histology Description\nLung,Adenocarcinoma\n";
        let err = HistologyVocabulary::from_reader(csv.as_bytes(), 3).unwrap_err();
        match err {
            OncostageError::MalformedTable(msg) => assert!(msg.contains(BEHAVIOR_COLUMN)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_histological_phrases("/nonexistent/histologies.csv", 3).unwrap_err();
        assert!(matches!(err, OncostageError::ResourceUnavailable { .. }));
    }
}
