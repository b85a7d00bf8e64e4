use docqa_core::error::{codes, AppError};
use serde::{Deserialize, Serialize};

use super::Llm;
use crate::ollama::{request_error, truncate_chars, OllamaClient};

/// Decoding settings for the paraphrase call. Defaults decode greedily with a short answer budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Prompts longer than this are cut before sending.
    pub max_input_chars: usize,
    pub max_output_tokens: u32,
    pub repeat_penalty: f32,
    pub repeat_last_n: u32,
    pub seed: u32,
    pub timeout_secs: u64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_input_chars: 4096,
            max_output_tokens: 120,
            repeat_penalty: 1.3,
            repeat_last_n: 64,
            seed: 0,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
    params: GenerationParams,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient) -> Self {
        Self {
            client,
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_k: u32,
    seed: u32,
    num_predict: u32,
    repeat_penalty: f32,
    repeat_last_n: u32,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl Llm for OllamaLlm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let prompt = truncate_chars(prompt, self.params.max_input_chars);
        let req = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: 0.0,
                top_k: 1,
                seed: self.params.seed,
                num_predict: self.params.max_output_tokens,
                repeat_penalty: self.params.repeat_penalty,
                repeat_last_n: self.params.repeat_last_n,
            },
        };
        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new(codes::AI_GENERATION_FAILED, "Failed to encode generate request")
                .with_details(e.to_string())
        })?;

        tracing::debug!(model, prompt_chars = prompt.chars().count(), "calling ollama generate");
        let resp = ureq::post(&url)
            .timeout(std::time::Duration::from_secs(self.params.timeout_secs))
            .send_json(body)
            .map_err(|e| request_error(e, codes::AI_GENERATION_FAILED))?;

        let v: GenerateResponse = resp.into_json().map_err(|e| {
            AppError::new(codes::AI_GENERATION_FAILED, "Failed to decode generate response")
                .with_details(e.to_string())
        })?;
        Ok(v.response)
    }
}
