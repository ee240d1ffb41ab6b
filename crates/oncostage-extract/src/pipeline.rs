//! Per-note staging pipeline.
//!
//! Tokenizes a note and runs the TNM, stage and histology extractors against a
//! shared set of vocabularies.

use oncostage_common::{OncostageError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fields::TnmStaging;
use crate::histology::{extract_histology_with_cutoff, DEFAULT_SIMILARITY_CUTOFF};
use crate::stage::extract_stage;
use crate::tnm::extract_tnm;
use crate::vocabulary::Vocabularies;

/// Batches above this size are processed in parallel when the `parallel` feature is on.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10;

/// Split a note on whitespace. Tokens are never empty.
pub fn tokenize(note: &str) -> Vec<&str> {
    note.split_whitespace().collect()
}

/// Staging fields extracted from one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteExtraction {
    pub note: String,
    pub histology: String,
    pub stage: String,
    pub tnm: TnmStaging,
}

/// Runs all extractors over notes.
pub struct NotePipeline {
    vocabularies: Vocabularies,
    similarity_cutoff: f64,
}

impl NotePipeline {
    pub fn new(vocabularies: Vocabularies) -> Self {
        Self {
            vocabularies,
            similarity_cutoff: DEFAULT_SIMILARITY_CUTOFF,
        }
    }

    /// Set the histology similarity cutoff, which must lie in `[0, 1]`.
    pub fn with_similarity_cutoff(mut self, cutoff: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(OncostageError::InvalidParameter(format!(
                "similarity cutoff must be in [0.0, 1.0]: {}",
                cutoff
            )));
        }
        self.similarity_cutoff = cutoff;
        Ok(self)
    }

    pub fn vocabularies(&self) -> &Vocabularies {
        &self.vocabularies
    }

    pub fn similarity_cutoff(&self) -> f64 {
        self.similarity_cutoff
    }

    /// Extract staging fields from a single note.
    pub fn extract(&self, note: &str) -> NoteExtraction {
        let tokens = tokenize(note);
        let vocab = &self.vocabularies;

        let extraction = NoteExtraction {
            note: note.to_string(),
            histology: extract_histology_with_cutoff(&tokens, &vocab.histology, self.similarity_cutoff),
            stage: extract_stage(&tokens, &vocab.stage),
            tnm: extract_tnm(&tokens, &vocab.tnm),
        };

        debug!(
            tokens = tokens.len(),
            histology = %extraction.histology,
            stage = %extraction.stage,
            "Extracted note"
        );
        extraction
    }

    /// Extract from many notes, preserving order.
    pub fn extract_batch(&self, notes: &[&str]) -> Vec<NoteExtraction> {
        self.extract_batch_with_threshold(notes, DEFAULT_PARALLEL_THRESHOLD)
    }

    /// Extract from many notes with explicit parallelism control.
    /// Set `parallel_threshold` to 0 to always process sequentially.
    pub fn extract_batch_with_threshold(
        &self,
        notes: &[&str],
        parallel_threshold: usize,
    ) -> Vec<NoteExtraction> {
        #[cfg(feature = "parallel")]
        {
            if parallel_threshold > 0 && notes.len() > parallel_threshold {
                use rayon::prelude::*;
                return notes.par_iter().map(|note| self.extract(note)).collect();
            }
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel_threshold;

        notes.iter().map(|note| self.extract(note)).collect()
    }
}
