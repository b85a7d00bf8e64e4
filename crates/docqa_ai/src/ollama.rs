use docqa_core::error::{codes, AppError};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

impl OllamaClient {
    /// Create a client for Ollama. Only `http://127.0.0.1` with an optional port is accepted.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let rejected = || {
            AppError::new(
                codes::AI_REMOTE_NOT_ALLOWED,
                "Ollama base URL must be http://127.0.0.1[:port]",
            )
            .with_details(format!("base_url={base_url}"))
        };

        let rest = base_url.strip_prefix("http://127.0.0.1").ok_or_else(rejected)?;
        if !rest.is_empty() {
            let port = rest.strip_prefix(':').ok_or_else(rejected)?;
            if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
                return Err(rejected());
            }
            match port.parse::<u32>() {
                Ok(p) if (1..=65535).contains(&p) => {}
                _ => return Err(rejected()),
            }
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url)
            .timeout(std::time::Duration::from_millis(800))
            .call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new(codes::AI_MODEL_UNHEALTHY, "Ollama health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(request_error(e, codes::AI_MODEL_UNHEALTHY)),
        }
    }
}

/// Transport failures become `AI_MODEL_UNAVAILABLE`; error statuses use `status_code`.
pub(crate) fn request_error(e: ureq::Error, status_code: &str) -> AppError {
    match e {
        ureq::Error::Status(status, _) => {
            AppError::new(status_code, "Ollama returned an error status")
                .with_details(format!("status={status}"))
        }
        ureq::Error::Transport(t) => AppError::new(
            codes::AI_MODEL_UNAVAILABLE,
            "Failed to reach Ollama on 127.0.0.1",
        )
        .with_details(t.to_string())
        .with_retryable(true),
    }
}

/// Cut `input` to at most `max_chars` characters without splitting a code point.
pub(crate) fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("₹₹₹₹", 2), "₹₹");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
