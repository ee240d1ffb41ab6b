//! Rule-based staging extraction from oncology notes.
//!
//! Pulls TNM codes, the stage group and the histologic type out of free-text
//! notes using exact code matching, stage-group patterns and fuzzy phrase
//! matching against reference vocabularies.

pub mod fields;
pub mod histology;
pub mod pipeline;
pub mod similarity;
pub mod stage;
pub mod tnm;
pub mod vocabulary;


pub use fields::{TnmCategory, TnmStaging, NOT_REPORTED};
pub use histology::{extract_histology, extract_histology_with_cutoff, DEFAULT_SIMILARITY_CUTOFF};
pub use pipeline::{tokenize, NoteExtraction, NotePipeline};
pub use stage::{canonicalize_stage, extract_stage};
pub use tnm::extract_tnm;
pub use vocabulary::{
    load_histological_phrases, HistologyVocabulary, StageVocabulary, TnmVocabulary, Vocabularies,
    DEFAULT_MAX_WORDS,
};

pub use oncostage_common::{OncostageError, Result};
