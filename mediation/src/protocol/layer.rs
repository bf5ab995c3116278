//! Context store, agent registry, and the append-only message log.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::message::{MessageRecord, MessageStatus};
use crate::privacy::{ContextEnvelope, Payload, PrivacyMechanism, PROTOCOL_TAG};

/// A stored context envelope with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct StoredContext {
    pub agent: String,
    pub envelope: ContextEnvelope,
    pub stored_at: DateTime<Utc>,
}

/// Aggregate protocol statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolStats {
    pub total_messages: usize,
    pub registered_agents: usize,
    pub contexts_stored: usize,
    pub privacy_level: String,
    pub protocol_version: String,
}

/// The mediating layer every inter-stage transfer passes through.
///
/// Owned by the orchestrator for exactly one analysis run. Sharing an
/// instance across concurrent runs is unsupported; give each run its own.
pub struct ProtocolLayer {
    privacy: PrivacyMechanism,
    contexts: HashMap<String, StoredContext>,
    messages: Vec<MessageRecord>,
    registry: HashMap<String, Vec<String>>,
}

impl ProtocolLayer {
    pub fn new(privacy: PrivacyMechanism) -> Self {
        Self {
            privacy,
            contexts: HashMap::new(),
            messages: Vec::new(),
            registry: HashMap::new(),
        }
    }

    /// Record an agent name. Idempotent; re-registration is a no-op.
    pub fn register(&mut self, agent_name: &str) {
        self.registry.entry(agent_name.to_string()).or_default();
    }

    /// Store a payload as an addressable context and return its id.
    ///
    /// Ids combine the agent name with a random hex suffix, so collisions
    /// are negligible within a run.
    pub fn create_context(&mut self, agent_name: &str, data: Payload, add_noise: bool) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        let context_id = format!("{}_{}", agent_name, &suffix[..8]);
        let envelope = self.privacy.make_envelope(&context_id, data, add_noise);

        self.contexts.insert(
            context_id.clone(),
            StoredContext {
                agent: agent_name.to_string(),
                envelope,
                stored_at: Utc::now(),
            },
        );

        context_id
    }

    /// Mediate one agent-to-agent transfer.
    ///
    /// Stores the (possibly perturbed) payload as a context, appends an
    /// immutable record to the message log, and indexes the message under
    /// the sending agent. Together with [`ProtocolLayer::reset`] this is
    /// the only mutation point of the log.
    pub fn share(
        &mut self,
        from_agent: &str,
        to_agent: &str,
        data: Payload,
        apply_privacy: bool,
    ) -> MessageRecord {
        let data_summary = data.summary();
        let context_id = self.create_context(from_agent, data, apply_privacy);

        let record = MessageRecord {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            from_agent: from_agent.to_string(),
            to_agent: to_agent.to_string(),
            context_id: context_id.clone(),
            data_summary,
            privacy_applied: apply_privacy,
            privacy_level: self.privacy.privacy_level(),
            protocol: PROTOCOL_TAG.to_string(),
            status: MessageStatus::Transmitted,
        };

        self.messages.push(record.clone());
        self.registry
            .entry(from_agent.to_string())
            .or_default()
            .push(record.id.clone());

        debug!(
            from = from_agent,
            to = to_agent,
            context = %context_id,
            privacy = apply_privacy,
            "Context shared"
        );

        record
    }

    /// Look up a stored context. Absent ids yield `None`, never an error.
    pub fn retrieve(&self, context_id: &str) -> Option<Payload> {
        self.contexts
            .get(context_id)
            .map(|stored| self.privacy.extract(&stored.envelope))
    }

    /// The full message log in insertion order.
    pub fn history(&self) -> &[MessageRecord] {
        &self.messages
    }

    /// Message ids sent by an agent, in send order.
    pub fn sent_by(&self, agent_name: &str) -> &[String] {
        self.registry
            .get(agent_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stats(&self) -> ProtocolStats {
        ProtocolStats {
            total_messages: self.messages.len(),
            registered_agents: self.registry.len(),
            contexts_stored: self.contexts.len(),
            privacy_level: self.privacy.privacy_level(),
            protocol_version: PROTOCOL_TAG.to_string(),
        }
    }

    /// Clear the log, context store, and per-agent message indexes.
    ///
    /// Only for reuse between independent runs, never mid-run. Registered
    /// agent names survive.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.contexts.clear();
        for sent in self.registry.values_mut() {
            sent.clear();
        }
        debug!("Protocol layer reset");
    }
}
