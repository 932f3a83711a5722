//! OpenAI-compatible completions backend
//!
//! Talks to any server exposing `POST /v1/completions` (OpenAI, Ollama,
//! llama.cpp server, vLLM). Credentials arrive already resolved.

use serde::{Deserialize, Serialize};
use ureq::Agent;

use super::{Backend, GenerationParams};
use crate::error::BackendError;

/// Default base URL (a local Ollama instance)
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatBackend {
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiCompatBackend {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/completions", self.base_url)
    }
}

impl Backend for OpenAiCompatBackend {
    fn invoke(&self, prompt: &str, params: &GenerationParams) -> Result<String, BackendError> {
        let request = CompletionRequest {
            model: &params.model,
            prompt,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };
        let request_body = serde_json::to_string(&request).map_err(|e| BackendError::Malformed(e.to_string()))?;

        let agent: Agent = Agent::config_builder().timeout_global(params.timeout).build().into();

        let url = self.endpoint();
        log::info!("POST {} model={}", url, params.model);

        let mut builder = agent.post(&url).header("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            builder = builder.header("Authorization", &format!("Bearer {}", key));
        }

        let mut response = builder.send(request_body.as_bytes()).map_err(map_ureq_error)?;
        let response_body = response.body_mut().read_to_string().map_err(map_ureq_error)?;

        parse_completion(&response_body)
    }
}

fn map_ureq_error(err: ureq::Error) -> BackendError {
    match err {
        ureq::Error::StatusCode(code) => BackendError::Status(code),
        ureq::Error::Timeout(_) => BackendError::Timeout,
        other => BackendError::Transport(other.to_string()),
    }
}

fn parse_completion(body: &str) -> Result<String, BackendError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Malformed(format!("invalid JSON: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text)
        .ok_or_else(|| BackendError::Malformed("no choices in response".to_string()))
}
