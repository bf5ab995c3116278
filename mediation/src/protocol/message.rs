//! Immutable message records — the entries of the audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery status of a message record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Payload stored and announced to the receiving agent.
    Transmitted,
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transmitted => write!(f, "transmitted"),
        }
    }
}

/// Record of one agent-to-agent transfer. Immutable once created.
///
/// `data_summary` is a bounded, lossy description of the payload shape;
/// the payload itself lives in the context store, never in the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub from_agent: String,
    pub to_agent: String,
    pub context_id: String,
    pub data_summary: String,
    pub privacy_applied: bool,
    pub privacy_level: String,
    pub protocol: String,
    pub status: MessageStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serde_roundtrip() {
        let record = MessageRecord {
            id: "m-1".into(),
            timestamp: Utc::now(),
            from_agent: "GapDetector".into(),
            to_agent: "Debater".into(),
            context_id: "GapDetector_0a1b2c3d".into(),
            data_summary: "vector[3]".into(),
            privacy_applied: true,
            privacy_level: "epsilon=1".into(),
            protocol: crate::privacy::PROTOCOL_TAG.into(),
            status: MessageStatus::Transmitted,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"status\":\"transmitted\""));

        let restored: MessageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.from_agent, "GapDetector");
        assert_eq!(restored.context_id, "GapDetector_0a1b2c3d");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(MessageStatus::Transmitted.to_string(), "transmitted");
    }
}
