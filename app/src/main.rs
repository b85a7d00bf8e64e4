use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use docqa_ai::corpus::ingest_and_embed;
use docqa_ai::embeddings::ollama_embed::OllamaEmbedder;
use docqa_ai::grounding::{GroundingPipeline, GroundingRules};
use docqa_ai::index::{EmbeddingCache, VectorIndex};
use docqa_ai::llm::ollama_llm::{GenerationParams, OllamaLlm};
use docqa_ai::ollama::{OllamaClient, DEFAULT_BASE_URL};
use docqa_ai::pipeline::{AnswerPipeline, QaResponse};
use docqa_ai::retrieve::Retriever;
use docqa_core::config::DocQaConfig;
use docqa_core::error::{codes, AppError};
use docqa_core::ingest::markdown::{load_documents, DEFAULT_MIN_CHUNK_WORDS};
use tracing_subscriber::EnvFilter;

const SNIPPET_CHARS: usize = 250;

/// Ask questions about a folder of markdown documents; answers come only from those documents.
#[derive(Debug, Parser)]
#[command(name = "docqa", version)]
struct Args {
    /// Directory of markdown documents to index.
    #[arg(long, env = "DOCQA_DATA_DIR", default_value = "data/raw")]
    data_dir: PathBuf,

    /// Where the vector index and embedding cache live.
    #[arg(long, env = "DOCQA_CACHE_DIR", default_value = "cache")]
    cache_dir: PathBuf,

    #[arg(long, env = "EMBEDDING_MODEL", default_value = "nomic-embed-text")]
    embedding_model: String,

    #[arg(long, env = "LLM_MODEL", default_value = "llama3.2")]
    llm_model: String,

    #[arg(long, env = "OLLAMA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    ollama_url: String,

    /// JSON file overriding thresholds and keyword tables.
    #[arg(long, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Load the existing index instead of re-ingesting the documents.
    #[arg(long)]
    skip_ingest: bool,

    /// Answer one question and exit.
    #[arg(long, short)]
    question: Option<String>,

    /// Print responses as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = %e.code, details = ?e.details, "{}", e.message);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = match args.config.as_deref() {
        Some(path) => DocQaConfig::load_from_path(path)?,
        None => DocQaConfig::default(),
    };

    let client = OllamaClient::new(&args.ollama_url)?;
    if let Err(e) = client.health_check() {
        tracing::warn!(err = %e, "ollama health check failed; continuing");
    }
    let embedder = OllamaEmbedder::new(client.clone());
    let llm = OllamaLlm::new(client).with_params(GenerationParams::default());

    let mut index = VectorIndex::open(args.cache_dir.clone());
    if !args.skip_ingest {
        let docs = load_documents(&args.data_dir, &["md"])?;
        let mut cache = EmbeddingCache::open(args.cache_dir.clone())?;
        let (vectors, chunks) = ingest_and_embed(
            &docs,
            &embedder,
            &args.embedding_model,
            DEFAULT_MIN_CHUNK_WORDS,
            &mut cache,
        )?;
        index.build(vectors, chunks)?;
    }
    index.load()?;

    let retriever = Retriever::new(
        &index,
        &embedder,
        args.embedding_model.clone(),
        config.retrieval.clone(),
        &config.lexicon,
    );
    let grounding = GroundingPipeline::new(GroundingRules::new(&config)?, &llm, args.llm_model.clone());
    let pipeline = AnswerPipeline::new(retriever, grounding);

    if let Some(q) = args.question.as_deref() {
        let res = pipeline.answer(q)?;
        return print_response(&res, args.json);
    }

    println!("System ready (type exit to quit)\n");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Ask: ");
        io::stdout().flush().ok();
        let line = match lines.next() {
            Some(Ok(l)) => l,
            Some(Err(e)) => {
                tracing::warn!(err = %e, "failed to read stdin");
                break;
            }
            None => break,
        };
        let q = line.trim();
        if q.eq_ignore_ascii_case("exit") {
            break;
        }

        match pipeline.answer(q) {
            Ok(res) => print_response(&res, args.json)?,
            // The model being down is not fatal for the session; the next question may work.
            Err(e) if e.retryable => eprintln!("error: {e}"),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn print_response(res: &QaResponse, json: bool) -> Result<(), AppError> {
    if json {
        let out = serde_json::to_string_pretty(res).map_err(|e| {
            AppError::new(codes::CLI_OUTPUT_FAILED, "Failed to encode response").with_details(e.to_string())
        })?;
        println!("{out}");
        return Ok(());
    }

    println!("\n--- Retrieved Context ---");
    for p in res.context.iter() {
        println!("[{}] {}", p.source(), snippet(p.content(), SNIPPET_CHARS));
    }
    println!("\n--- Answer ---");
    println!("{}\n", res.answer);
    Ok(())
}

fn snippet(text: &str, max_chars: usize) -> String {
    let t = text.trim();
    match t.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &t[..idx]),
        None => t.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_cuts_on_char_boundaries() {
        assert_eq!(snippet("  ₹ 50,000  ", 3), "₹ 5...");
        assert_eq!(snippet("short", 250), "short");
    }

    #[test]
    fn args_parse_with_defaults() {
        let args = Args::try_parse_from(["docqa", "--skip-ingest", "-q", "what is escrow"]).expect("parse");
        assert!(args.skip_ingest);
        assert_eq!(args.question.as_deref(), Some("what is escrow"));
        assert!(!args.json);
    }
}
