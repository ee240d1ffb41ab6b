//! End-to-end extraction against a histology table on disk.

use std::io::Write;

use oncostage_extract::{
    canonicalize_stage, extract_histology, extract_stage, extract_tnm, load_histological_phrases,
    tokenize, NotePipeline, OncostageError, StageVocabulary, TnmVocabulary, Vocabularies,
    NOT_REPORTED,
};
use proptest::prelude::*;

const HISTOLOGIES_CSV: &str = "\
Site Code,Site Description,Histology Code,Histology Description,Histology/Behavior Code,Histology/Behavior Description
C340,\"Main bronchus\",8140,Adenocarcinoma,8140/3,\"Adenocarcinoma, NOS\"
C341,\"Upper lobe, lung\",8140,Adenocarcinoma,8140/2,\"Adenocarcinoma in situ, NOS\"
C779,\"Lymph nodes, NOS\",9650,Hodgkin lymphoma,9650/3,\"Hodgkin lymphoma, NOS\"
C500,Nipple,8500,Infiltrating duct carcinoma of the breast,8500/3,\"Infiltrating duct carcinoma, NOS\"
";

fn histology_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(HISTOLOGIES_CSV.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_histological_phrases_from_disk() {
    let file = histology_file();
    let vocab = load_histological_phrases(file.path(), 3).unwrap();

    assert_eq!(
        vocab.phrases(),
        &[
            "main bronchus",
            "upper lobe lung",
            "lymph nodes nos",
            "nipple",
            "adenocarcinoma",
            "hodgkin lymphoma",
            "adenocarcinoma nos",
            "hodgkin lymphoma nos",
        ]
    );
}

#[test]
fn test_duplicates_across_columns_appear_once() {
    let file = histology_file();
    let vocab = load_histological_phrases(file.path(), 10).unwrap();
    let count = vocab.phrases().iter().filter(|p| *p == "hodgkin lymphoma").count();
    assert_eq!(count, 1);
    assert!(vocab.phrases().iter().any(|p| p == "adenocarcinoma in situ nos"));
}

#[test]
fn test_missing_histology_file_is_fatal() {
    let err = Vocabularies::load("/does/not/exist.csv", 3).unwrap_err();
    assert!(matches!(err, OncostageError::ResourceUnavailable { .. }));
    assert!(err.to_string().contains("/does/not/exist.csv"));
}

#[test]
fn test_pipeline_over_loaded_vocabulary() {
    let file = histology_file();
    let pipeline = NotePipeline::new(Vocabularies::load(file.path(), 3).unwrap());

    let extraction = pipeline.extract("Biopsy: adenocarcnoma of main bronchus stg IIb T2bN1 M0");
    assert_eq!(extraction.histology, "main bronchus");
    assert_eq!(extraction.stage, "IIB");
    assert_eq!(extraction.tnm.t, "T2b");
    assert_eq!(extraction.tnm.n, "N1");
    assert_eq!(extraction.tnm.m, "M0");
}

#[test]
fn test_extractors_take_plain_token_slices() {
    let file = histology_file();
    let vocab = load_histological_phrases(file.path(), 3).unwrap();
    let tokens = tokenize("Patient has Stage 4 TXN0 hodgkn lymphma M1c");

    assert_eq!(extract_histology(&tokens, &vocab), "hodgkin lymphoma");
    assert_eq!(extract_stage(&tokens, &StageVocabulary::standard()), "IV");
    assert_eq!(extract_tnm(&tokens, &TnmVocabulary::standard()).m, "M1c");
}

fn code_sequence() -> impl Strategy<Value = Vec<&'static str>> {
    let codes = ["TX", "Tis", "T1mi", "T2a", "T3", "Nx", "N1", "N3", "M0", "M1b"];
    proptest::collection::vec(proptest::sample::select(codes.to_vec()), 1..4)
}

proptest! {
    /// Extractors never panic and always produce a value.
    #[test]
    fn prop_extractors_are_total(note in "[ a-zA-Z0-9]{0,60}") {
        let tokens = tokenize(&note);
        let tnm = extract_tnm(&tokens, &TnmVocabulary::standard());
        let stage = extract_stage(&tokens, &StageVocabulary::standard());
        prop_assert!(!tnm.t.is_empty() && !tnm.n.is_empty() && !tnm.m.is_empty());
        prop_assert!(!stage.is_empty());
    }

    /// A stage result is already canonical.
    #[test]
    fn prop_stage_canonical_form_is_stable(note in "(stage )?[0-4IVABC ]{0,12}") {
        let stage = extract_stage(&tokenize(&note), &StageVocabulary::standard());
        prop_assert_eq!(canonicalize_stage(&stage), stage.clone());
        prop_assert!(!stage.starts_with(|c: char| ('1'..='4').contains(&c)));
    }

    /// Without a category repeated, a token of concatenated codes yields each code.
    #[test]
    fn prop_concatenated_codes_recovered(codes in code_sequence()) {
        let mut by_axis = std::collections::HashMap::new();
        for code in &codes {
            by_axis.entry(&code[..1]).or_insert(*code);
        }
        prop_assume!(by_axis.len() == codes.len());

        let token = codes.concat().to_lowercase();
        let tnm = extract_tnm(&[token.as_str()], &TnmVocabulary::standard());
        for (axis, code) in by_axis {
            let found = match axis {
                "T" => &tnm.t,
                "N" => &tnm.n,
                _ => &tnm.m,
            };
            prop_assert_eq!(found.as_str(), code);
        }
    }

    /// Trailing letters after a code block reject the whole token.
    #[test]
    fn prop_residue_rejects_token(suffix in "[qwyz]{1,4}") {
        let token = format!("t2an1{}", suffix);
        let tnm = extract_tnm(&[token.as_str()], &TnmVocabulary::standard());
        prop_assert_eq!(tnm.t.as_str(), NOT_REPORTED);
        prop_assert_eq!(tnm.n.as_str(), NOT_REPORTED);
    }
}
