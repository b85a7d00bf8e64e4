use std::fs;

use docqa_core::config::{DocQaConfig, IntentRule};
use pretty_assertions::assert_eq;

#[test]
fn partial_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("docqa.json");
    fs::write(
        &path,
        r#"{
            "retrieval": { "top_k": 8 },
            "lexicon": {
                "packages": ["gold", "silver"],
                "intents": [{ "keyword": "refund", "intent": "refund" }]
            }
        }"#,
    )
    .expect("write");

    let cfg = DocQaConfig::load_from_path(&path).expect("load");
    assert_eq!(cfg.retrieval.top_k, 8);
    assert_eq!(cfg.retrieval.max_passages, 2);
    assert_eq!(cfg.lexicon.packages, vec!["gold".to_string(), "silver".to_string()]);
    assert_eq!(cfg.lexicon.intents, vec![IntentRule::new("refund", "refund")]);
    assert_eq!(cfg.grounding, DocQaConfig::default().grounding);
    assert!(cfg.lexicon.retrieval_stop_words.contains(&"the".to_string()));
}

#[test]
fn invalid_numeric_pattern_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("docqa.json");
    fs::write(&path, r#"{ "lexicon": { "numeric_pattern": "(unclosed" } }"#).expect("write");
    let err = DocQaConfig::load_from_path(&path).expect_err("bad regex");
    assert_eq!(err.code, "CONFIG_INVALID");
}

#[test]
fn zero_top_k_is_rejected() {
    let mut cfg = DocQaConfig::default();
    cfg.retrieval.top_k = 0;
    let err = cfg.validate().expect_err("zero top_k");
    assert_eq!(err.code, "CONFIG_INVALID");
    assert_eq!(err.details.as_deref(), Some("field=retrieval.top_k"));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = DocQaConfig::load_from_path(&dir.path().join("absent.json")).expect_err("missing");
    assert_eq!(err.code, "CONFIG_READ_FAILED");
}

#[test]
fn default_numeric_pattern_matches_rupee_amounts() {
    let re = DocQaConfig::default()
        .lexicon
        .compile_numeric_pattern()
        .expect("compile");
    let m = re.find("Premier package costs ₹ 50,000 per month").expect("match");
    assert_eq!(m.as_str(), "₹ 50,000");
    let m = re.find("Rate is 1,850 / sqft for Essential").expect("match");
    assert_eq!(m.as_str(), "1,850 / sqft");
}

#[test]
fn numeric_pattern_matching_empty_text_is_rejected() {
    let mut cfg = DocQaConfig::default();
    cfg.lexicon.numeric_pattern = r"\d*".to_string();
    let err = cfg.validate().expect_err("empty match");
    assert_eq!(err.code, "CONFIG_INVALID");
    assert_eq!(err.details.as_deref(), Some(r"pattern=\d*"));

    cfg.lexicon.numeric_pattern = r"\d+".to_string();
    cfg.validate().expect("non-empty pattern");
}

#[test]
fn zero_fact_word_minimums_are_rejected() {
    let mut cfg = DocQaConfig::default();
    cfg.facts.bullet_min_words = 0;
    let err = cfg.validate().expect_err("zero bullet words");
    assert_eq!(err.details.as_deref(), Some("field=facts.bullet_min_words"));

    let mut cfg = DocQaConfig::default();
    cfg.facts.line_min_words = 0;
    let err = cfg.validate().expect_err("zero line words");
    assert_eq!(err.details.as_deref(), Some("field=facts.line_min_words"));
}
