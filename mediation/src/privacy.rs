//! Differential-privacy mechanism for inter-agent payloads.
//!
//! Numeric vectors are perturbed with calibrated Laplace noise before they
//! leave the producing stage. Noise scale is `sensitivity / epsilon`, so a
//! smaller privacy budget means more noise and stronger privacy. Text and
//! structured payloads pass through untouched; the mechanism has no
//! defined treatment for them, and never fails on payload shape.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Protocol identifier stamped on every envelope and message record.
///
/// Downstream report generation matches on this literal verbatim; bump it
/// only together with the report consumers.
pub const PROTOCOL_TAG: &str = "MCP-DP-v1.0";

/// Longest payload preview echoed into the message log.
const SUMMARY_LIMIT: usize = 96;

/// Error type for mechanism construction.
#[derive(Debug, thiserror::Error)]
pub enum PrivacyError {
    #[error("privacy budget must be positive, got epsilon={0}")]
    InvalidEpsilon(f64),

    #[error("sensitivity must be positive, got {0}")]
    InvalidSensitivity(f64),
}

/// A payload crossing the protocol layer, tagged by shape.
///
/// The tag decides noise eligibility: only `Vector` payloads are ever
/// perturbed. `Text` carries generated language and `Json` carries
/// structured records, both opaque to the mechanism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// Numeric vector (e.g. an embedding) — noise-eligible.
    Vector(Vec<f64>),
    /// Opaque generated text.
    Text(String),
    /// Opaque structured record.
    Json(serde_json::Value),
}

impl Payload {
    /// Bounded, lossy description of the payload for the message log.
    ///
    /// Raw payloads never enter the permanent log, only this projection.
    pub fn summary(&self) -> String {
        match self {
            Payload::Vector(v) => format!("vector[{}]", v.len()),
            Payload::Text(t) => truncate(t),
            Payload::Json(v) => truncate(&v.to_string()),
        }
    }
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= SUMMARY_LIMIT {
        return s.to_string();
    }
    let head: String = s.chars().take(SUMMARY_LIMIT).collect();
    format!("{head}...")
}

/// Wrapper around a payload carrying privacy metadata.
///
/// Produced and consumed only by the protocol layer; stored per transfer
/// and addressable by `context_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEnvelope {
    pub context_id: String,
    pub data: Payload,
    pub privacy_level: String,
    pub protocol: String,
}

/// The Laplace mechanism, stateless given `(epsilon, sensitivity)`.
#[derive(Debug, Clone)]
pub struct PrivacyMechanism {
    epsilon: f64,
    sensitivity: f64,
}

impl PrivacyMechanism {
    pub fn new(epsilon: f64, sensitivity: f64) -> Result<Self, PrivacyError> {
        if !(epsilon > 0.0) {
            return Err(PrivacyError::InvalidEpsilon(epsilon));
        }
        if !(sensitivity > 0.0) {
            return Err(PrivacyError::InvalidSensitivity(sensitivity));
        }
        Ok(Self {
            epsilon,
            sensitivity,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Scale parameter of the Laplace distribution.
    pub fn scale(&self) -> f64 {
        self.sensitivity / self.epsilon
    }

    /// Privacy level string stamped on envelopes and message records.
    pub fn privacy_level(&self) -> String {
        format!("epsilon={}", self.epsilon)
    }

    /// Draw one Laplace(0, scale) sample by inverse-CDF transform.
    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen::<f64>() - 0.5;
        -self.scale() * u.signum() * (1.0 - 2.0 * u.abs()).ln()
    }

    /// Perturb each element independently. Output length equals input.
    pub fn perturb_vector(&self, values: &[f64]) -> Vec<f64> {
        self.perturb_vector_with(values, &mut rand::thread_rng())
    }

    /// Seeded variant backing `perturb_vector`; used directly by tests.
    pub fn perturb_vector_with<R: Rng>(&self, values: &[f64], rng: &mut R) -> Vec<f64> {
        values.iter().map(|v| v + self.sample(rng)).collect()
    }

    /// Row-wise `perturb_vector` over a batch of vectors.
    pub fn perturb_batch(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.perturb_vector(row)).collect()
    }

    /// Build an envelope, perturbing the payload when eligible.
    ///
    /// Only a non-empty numeric vector is ever noised; every other payload
    /// shape passes through unchanged.
    pub fn make_envelope(&self, context_id: &str, data: Payload, add_noise: bool) -> ContextEnvelope {
        let data = match data {
            Payload::Vector(v) if add_noise && !v.is_empty() => {
                Payload::Vector(self.perturb_vector(&v))
            }
            other => other,
        };

        ContextEnvelope {
            context_id: context_id.to_string(),
            data,
            privacy_level: self.privacy_level(),
            protocol: PROTOCOL_TAG.to_string(),
        }
    }

    /// Pure projection of the payload out of an envelope.
    pub fn extract(&self, envelope: &ContextEnvelope) -> Payload {
        envelope.data.clone()
    }

    /// Occasionally insert a `[DP-NOISE]` marker into free text.
    ///
    /// Fires with probability `noise_level`, and only on texts longer than
    /// a handful of words. Short texts come back unchanged.
    pub fn add_text_noise(&self, text: &str, noise_level: f64) -> String {
        self.add_text_noise_with(text, noise_level, &mut rand::thread_rng())
    }

    pub fn add_text_noise_with<R: Rng>(&self, text: &str, noise_level: f64, rng: &mut R) -> String {
        if rng.gen::<f64>() >= noise_level {
            return text.to_string();
        }
        let mut words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= 5 {
            return text.to_string();
        }
        let idx = rng.gen_range(0..words.len());
        words.insert(idx, "[DP-NOISE]");
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn mechanism() -> PrivacyMechanism {
        PrivacyMechanism::new(1.0, 1.0).unwrap()
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(matches!(
            PrivacyMechanism::new(0.0, 1.0),
            Err(PrivacyError::InvalidEpsilon(_))
        ));
        assert!(matches!(
            PrivacyMechanism::new(-1.0, 1.0),
            Err(PrivacyError::InvalidEpsilon(_))
        ));
        assert!(matches!(
            PrivacyMechanism::new(1.0, 0.0),
            Err(PrivacyError::InvalidSensitivity(_))
        ));
    }

    #[test]
    fn test_perturb_preserves_length_and_changes_values() {
        let privacy = mechanism();
        let mut rng = StdRng::seed_from_u64(7);
        let original = vec![0.1, 0.2, 0.3, 0.4, 0.5];

        let perturbed = privacy.perturb_vector_with(&original, &mut rng);

        assert_eq!(perturbed.len(), original.len());
        for (a, b) in original.iter().zip(&perturbed) {
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_large_epsilon_means_small_noise() {
        let privacy = PrivacyMechanism::new(1e9, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let original = vec![1.0, 2.0, 3.0];

        let perturbed = privacy.perturb_vector_with(&original, &mut rng);

        for (a, b) in original.iter().zip(&perturbed) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_perturb_batch_is_row_wise() {
        let privacy = mechanism();
        let rows = vec![vec![0.1, 0.2], vec![0.3, 0.4, 0.5]];

        let perturbed = privacy.perturb_batch(&rows);

        assert_eq!(perturbed.len(), 2);
        assert_eq!(perturbed[0].len(), 2);
        assert_eq!(perturbed[1].len(), 3);
    }

    #[test]
    fn test_envelope_without_noise_round_trips_every_shape() {
        let privacy = mechanism();
        let payloads = vec![
            Payload::Vector(vec![0.1, 0.2]),
            Payload::Vector(vec![]),
            Payload::Text("the gaps are elsewhere".into()),
            Payload::Json(json!({"gaps": ["a", "b"]})),
        ];

        for payload in payloads {
            let envelope = privacy.make_envelope("ctx", payload.clone(), false);
            assert_eq!(privacy.extract(&envelope), payload);
        }
    }

    #[test]
    fn test_envelope_noises_only_nonempty_vectors() {
        let privacy = mechanism();

        let envelope = privacy.make_envelope("ctx", Payload::Vector(vec![0.1, 0.2, 0.3]), true);
        match privacy.extract(&envelope) {
            Payload::Vector(v) => {
                assert_eq!(v.len(), 3);
                assert_ne!(v, vec![0.1, 0.2, 0.3]);
            }
            other => panic!("expected vector, got {other:?}"),
        }

        // Empty vectors and opaque payloads are untouched even with noise on.
        let empty = privacy.make_envelope("ctx", Payload::Vector(vec![]), true);
        assert_eq!(privacy.extract(&empty), Payload::Vector(vec![]));

        let text = Payload::Text("no numbers here".into());
        let envelope = privacy.make_envelope("ctx", text.clone(), true);
        assert_eq!(privacy.extract(&envelope), text);

        let structured = Payload::Json(json!({"score": 7.5}));
        let envelope = privacy.make_envelope("ctx", structured.clone(), true);
        assert_eq!(privacy.extract(&envelope), structured);
    }

    #[test]
    fn test_envelope_metadata() {
        let privacy = PrivacyMechanism::new(0.5, 1.0).unwrap();
        let envelope = privacy.make_envelope("agent_abc123", Payload::Text("hi".into()), false);

        assert_eq!(envelope.context_id, "agent_abc123");
        assert_eq!(envelope.privacy_level, "epsilon=0.5");
        assert_eq!(envelope.protocol, PROTOCOL_TAG);
    }

    #[test]
    fn test_summary_is_bounded() {
        let long = "x".repeat(500);
        let summary = Payload::Text(long).summary();
        assert!(summary.chars().count() <= SUMMARY_LIMIT + 3);
        assert!(summary.ends_with("..."));

        assert_eq!(Payload::Vector(vec![0.0; 384]).summary(), "vector[384]");
    }

    #[test]
    fn test_text_noise_marker() {
        let privacy = mechanism();
        let text = "one two three four five six seven eight";

        let mut rng = StdRng::seed_from_u64(3);
        let noised = privacy.add_text_noise_with(text, 1.0, &mut rng);
        assert!(noised.contains("[DP-NOISE]"));

        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(privacy.add_text_noise_with(text, 0.0, &mut rng), text);

        // Too short to noise.
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(privacy.add_text_noise_with("too short", 1.0, &mut rng), "too short");
    }
}
