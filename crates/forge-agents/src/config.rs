//! Runtime configuration for the pipeline.
//!
//! Defaults are overridable through `FORGE_*` environment variables, with
//! CLI flags layered on top by the binary.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_iterations must be at least 1")]
    ZeroIterations,

    #[error("epsilon must be positive, got {0}")]
    InvalidEpsilon(f64),

    #[error("sensitivity must be positive, got {0}")]
    InvalidSensitivity(f64),

    #[error("top_k must be at least 1")]
    ZeroTopK,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { overlap: usize, size: usize },
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgeConfig {
    /// Ollama model used for every generation call.
    pub model: String,
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Evolutionary rounds before finalizing.
    pub max_iterations: u32,
    /// Privacy budget — lower means more noise, stronger privacy.
    pub epsilon: f64,
    /// Assumed per-value influence, calibrates the noise scale.
    pub sensitivity: f64,
    /// Hypotheses kept in the final ranking.
    pub top_k: usize,
    /// Characters per document chunk.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            model: std::env::var("FORGE_MODEL").unwrap_or_else(|_| "mistral".into()),
            base_url: std::env::var("FORGE_OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".into()),
            max_iterations: 3,
            epsilon: 1.0,
            sensitivity: 1.0,
            top_k: 5,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ForgeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations < 1 {
            return Err(ConfigError::ZeroIterations);
        }
        if !(self.epsilon > 0.0) {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }
        if !(self.sensitivity > 0.0) {
            return Err(ConfigError::InvalidSensitivity(self.sensitivity));
        }
        if self.top_k < 1 {
            return Err(ConfigError::ZeroTopK);
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.chunk_overlap,
                size: self.chunk_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ForgeConfig {
        ForgeConfig {
            model: "mistral".into(),
            base_url: "http://localhost:11434".into(),
            max_iterations: 3,
            epsilon: 1.0,
            sensitivity: 1.0,
            top_k: 5,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let mut config = base();
        config.max_iterations = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroIterations)));
    }

    #[test]
    fn test_rejects_non_positive_privacy_parameters() {
        let mut config = base();
        config.epsilon = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEpsilon(_))
        ));

        let mut config = base();
        config.sensitivity = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSensitivity(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_overlap() {
        let mut config = base();
        config.chunk_overlap = 1000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OverlapTooLarge { .. })
        ));
    }
}
