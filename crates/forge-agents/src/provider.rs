//! Generation collaborator boundary.
//!
//! The pipeline treats language generation as a black box: a structured
//! prompt context goes in, opaque text comes out. The production
//! implementation talks to a local Ollama server (no API keys needed);
//! tests supply scripted stand-ins. Failures here are caught at the stage
//! boundary; only an unreachable backend at startup is fatal.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("generation backend unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation response malformed: {0}")]
    Malformed(String),
}

/// Structured prompt context for one generation call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// Persona the call is made as (e.g. "Research Gap Detector").
    pub role: String,
    /// The task instruction.
    pub instruction: String,
    /// Labeled context sections appended to the prompt.
    pub context: Vec<(String, String)>,
}

impl GenerationRequest {
    pub fn new(role: &str, instruction: &str) -> Self {
        Self {
            role: role.to_string(),
            instruction: instruction.to_string(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, label: &str, body: &str) -> Self {
        self.context.push((label.to_string(), body.to_string()));
        self
    }

    /// Render to a flat prompt string.
    pub fn render(&self) -> String {
        let mut prompt = format!("You are {}.\n\n{}\n", self.role, self.instruction);
        for (label, body) in &self.context {
            prompt.push_str(&format!("\n## {label}\n{body}\n"));
        }
        prompt
    }
}

/// Anything that can turn a prompt context into text.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

/// Ollama-backed provider (local inference).
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaGenerateBody<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Verify the backend is reachable before any stage runs.
    ///
    /// A failure here is fatal for the whole run; nothing has started yet
    /// and nothing will.
    pub async fn probe(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(ProviderError::Unreachable {
                url: self.base_url.clone(),
                reason: format!("status {}", resp.status()),
            }),
            Err(e) => Err(ProviderError::Unreachable {
                url: self.base_url.clone(),
                reason: format!("{e}. Start the server with: ollama serve"),
            }),
        }
    }
}

#[async_trait]
impl GenerationProvider for OllamaProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateBody {
            model: &self.model,
            prompt: request.render(),
            stream: false,
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProviderError::Request(format!("status {}", resp.status())));
        }

        let parsed: OllamaGenerateResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_render_includes_sections() {
        let request = GenerationRequest::new("Critical Debater", "Argue the case.")
            .with_context("Gap", "Limited evaluation methods")
            .with_context("Goal", "find weaknesses");

        let prompt = request.render();
        assert!(prompt.starts_with("You are Critical Debater."));
        assert!(prompt.contains("Argue the case."));
        assert!(prompt.contains("## Gap\nLimited evaluation methods"));
        assert!(prompt.contains("## Goal\nfind weaknesses"));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let provider = OllamaProvider::new("http://localhost:11434/", "mistral");
        assert_eq!(provider.base_url, "http://localhost:11434");
    }
}
