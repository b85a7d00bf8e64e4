use std::cell::Cell;

use docqa_ai::embeddings::Embedder;
use docqa_ai::grounding::{GroundingPipeline, GroundingRules};
use docqa_ai::index::VectorIndex;
use docqa_ai::llm::Llm;
use docqa_ai::pipeline::AnswerPipeline;
use docqa_ai::retrieve::Retriever;
use docqa_core::config::{DocQaConfig, REFUSAL_SENTENCE};
use docqa_core::domain::Chunk;
use docqa_core::error::AppError;

const VOCAB: [&str; 4] = ["escrow", "payments", "delay", "steel"];

/// Counts vocabulary words, plus a small constant so no text embeds to zero.
struct VocabEmbedder;

impl Embedder for VocabEmbedder {
    fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        let mut v = vec![0.0f32; VOCAB.len() + 1];
        for word in input.split_whitespace() {
            let word = word.to_lowercase();
            if let Some(i) = VOCAB.iter().position(|w| *w == word) {
                v[i] += 1.0;
            }
        }
        v[VOCAB.len()] = 0.1;
        Ok(v)
    }
}

struct CountingLlm {
    calls: Cell<usize>,
}

impl Llm for CountingLlm {
    fn generate(&self, _model: &str, _prompt: &str) -> Result<String, AppError> {
        self.calls.set(self.calls.get() + 1);
        Ok("paraphrased".to_string())
    }
}

fn build_index(dir: &std::path::Path, texts: &[(&str, &str)]) -> VectorIndex {
    let chunks = texts
        .iter()
        .map(|(source, content)| Chunk::new(*source, *content))
        .collect::<Vec<_>>();
    let vectors = chunks
        .iter()
        .map(|c| {
            let v = VocabEmbedder.embed("mock", &c.content).expect("embed");
            docqa_ai::index::similarity::normalize(v)
        })
        .collect::<Vec<_>>();
    let mut index = VectorIndex::open(dir.to_path_buf());
    index.build(vectors, chunks).expect("build");
    index
}

#[test]
fn overlap_gate_drops_candidates_and_keeps_similarity_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let index = build_index(
        dir.path(),
        &[
            ("notes.md", "Escrow escrow escrow notes"),
            ("escrow.md", "The escrow account holds client payments until approval"),
            ("delay.md", "Delay penalties apply after thirty days"),
            ("release.md", "Client escrow payments are released per milestone"),
        ],
    );
    let cfg = DocQaConfig::default();
    let retriever = Retriever::new(&index, &VocabEmbedder, "mock", cfg.retrieval.clone(), &cfg.lexicon);

    let ctx = retriever.retrieve("escrow client payments").expect("retrieve");
    let sources = ctx.iter().map(|p| p.source()).collect::<Vec<_>>();
    assert_eq!(sources, vec!["escrow.md", "release.md"]);
    assert!(ctx[0].rank < ctx[1].rank);
}

#[test]
fn at_most_two_passages_are_kept() {
    let dir = tempfile::tempdir().expect("tempdir");
    let index = build_index(
        dir.path(),
        &[
            ("a.md", "escrow payments one"),
            ("b.md", "escrow payments two"),
            ("c.md", "escrow payments three"),
        ],
    );
    let cfg = DocQaConfig::default();
    let retriever = Retriever::new(&index, &VocabEmbedder, "mock", cfg.retrieval.clone(), &cfg.lexicon);
    let ctx = retriever.retrieve("escrow payments").expect("retrieve");
    assert_eq!(ctx.len(), 2);
}

#[test]
fn low_overlap_candidates_yield_no_context_and_a_refusal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let index = build_index(
        dir.path(),
        &[
            ("steel.md", "- Steel grade is verified on delivery"),
            ("delay.md", "- Delay notice must be written down"),
        ],
    );
    let cfg = DocQaConfig::default();
    let retriever = Retriever::new(&index, &VocabEmbedder, "mock", cfg.retrieval.clone(), &cfg.lexicon);
    assert!(retriever.retrieve("steel delay rules").expect("retrieve").is_empty());

    let llm = CountingLlm { calls: Cell::new(0) };
    let grounding = GroundingPipeline::new(GroundingRules::new(&cfg).expect("rules"), &llm, "mock");
    let pipeline = AnswerPipeline::new(retriever, grounding);

    let res = pipeline.answer("steel delay rules").expect("answer");
    assert!(res.context.is_empty());
    assert_eq!(res.answer.text(), REFUSAL_SENTENCE);
    assert_eq!(llm.calls.get(), 0);
}

#[test]
fn empty_question_flows_through_to_a_refusal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let index = build_index(dir.path(), &[("a.md", "- escrow payments are held safely")]);
    let cfg = DocQaConfig::default();
    let retriever = Retriever::new(&index, &VocabEmbedder, "mock", cfg.retrieval.clone(), &cfg.lexicon);
    let llm = CountingLlm { calls: Cell::new(0) };
    let grounding = GroundingPipeline::new(GroundingRules::new(&cfg).expect("rules"), &llm, "mock");

    let res = AnswerPipeline::new(retriever, grounding).answer("").expect("answer");
    assert!(res.context.is_empty());
    assert!(res.answer.is_refusal());
}

#[test]
fn answer_returns_supporting_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let index = build_index(
        dir.path(),
        &[
            ("escrow.md", "## Escrow\n- Escrow holds client payments until milestone approval"),
            ("steel.md", "## Steel\n- Steel bars are sourced from approved mills"),
        ],
    );
    let cfg = DocQaConfig::default();
    let retriever = Retriever::new(&index, &VocabEmbedder, "mock", cfg.retrieval.clone(), &cfg.lexicon);
    let llm = CountingLlm { calls: Cell::new(0) };
    let grounding = GroundingPipeline::new(GroundingRules::new(&cfg).expect("rules"), &llm, "mock");

    let res = AnswerPipeline::new(retriever, grounding)
        .answer("when are escrow payments released")
        .expect("answer");
    assert_eq!(res.context.len(), 1);
    assert_eq!(res.context[0].source(), "escrow.md");
    assert_eq!(res.answer.text(), "Escrow holds client payments until milestone approval");
    assert_eq!(res.answer.supporting_facts()[0].source, "escrow.md");
    assert_eq!(llm.calls.get(), 0);
}

#[test]
fn retrieval_surfaces_index_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let index = VectorIndex::open(dir.path().to_path_buf());
    let cfg = DocQaConfig::default();
    let retriever = Retriever::new(&index, &VocabEmbedder, "mock", cfg.retrieval.clone(), &cfg.lexicon);
    let err = retriever.retrieve("escrow payments").expect_err("not loaded");
    assert_eq!(err.code, "AI_INDEX_NOT_READY");
}
