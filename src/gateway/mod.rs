//! Text-generation gateway
//!
//! [`ResponseGateway`] performs exactly one backend call per request and
//! turns every backend failure into a [`GenerationError`]. Backends only need
//! to map a prompt plus [`GenerationParams`] to text.

pub mod openai;

use std::time::Duration;

use crate::error::{BackendError, GenerationError};

/// Per-call generation settings
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Option<Duration>,
}

/// A text-completion backend
pub trait Backend {
    fn invoke(&self, prompt: &str, params: &GenerationParams) -> Result<String, BackendError>;
}

impl<F> Backend for F
where
    F: Fn(&str, &GenerationParams) -> Result<String, BackendError>,
{
    fn invoke(&self, prompt: &str, params: &GenerationParams) -> Result<String, BackendError> {
        self(prompt, params)
    }
}

pub struct ResponseGateway<B> {
    backend: B,
    params: GenerationParams,
}

impl<B: Backend> ResponseGateway<B> {
    pub fn new(backend: B, params: GenerationParams) -> Self {
        Self { backend, params }
    }

    /// Run one completion
    pub fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        log::debug!(
            "Generating with model={} max_tokens={} prompt_chars={}",
            self.params.model,
            self.params.max_tokens,
            prompt.chars().count()
        );

        match self.backend.invoke(prompt, &self.params) {
            Ok(text) => {
                log::debug!("Backend returned {} chars", text.chars().count());
                Ok(text)
            }
            Err(e) => {
                let err = GenerationError::from(e);
                log::warn!("Generation failed ({}): {}", self.params.model, err.message());
                Err(err)
            }
        }
    }
}
