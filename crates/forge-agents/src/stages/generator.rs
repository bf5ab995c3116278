//! Hypothesis generation from the current round's debates.

use mediation::{Payload, ProtocolLayer};
use tracing::{info, warn};

use super::UNAVAILABLE_MARKER;
use crate::provider::{GenerationProvider, GenerationRequest};
use crate::state::{AgentRole, DebateRecord, HypothesisRecord, RunState};

/// Draft one hypothesis per debate held this round.
///
/// Only debates tagged with the current iteration are considered; earlier
/// rounds' debates stay in the history untouched. New hypotheses start
/// unscored.
pub async fn run(
    state: &mut RunState,
    provider: &dyn GenerationProvider,
    protocol: &mut ProtocolLayer,
) {
    let round = state.iteration;
    let current: Vec<DebateRecord> = state
        .debates
        .iter()
        .filter(|d| d.iteration == round)
        .cloned()
        .collect();

    let mut new_hypotheses = Vec::new();
    for debate in &current {
        let proposal = propose(provider, debate).await;
        new_hypotheses.push(HypothesisRecord {
            gap: debate.gap.clone(),
            proposal,
            iteration: round,
            score: 0.0,
        });
    }

    state.hypotheses.extend(new_hypotheses.iter().cloned());

    let payload = Payload::Json(serde_json::to_value(&new_hypotheses).unwrap_or_default());
    let message = protocol.share(
        AgentRole::HypothesisGenerator.name(),
        AgentRole::EvolutionAgent.name(),
        payload,
        true,
    );
    state.mcp_messages.push(message);
    state.push_trace(
        AgentRole::HypothesisGenerator,
        "generate_hypotheses",
        format!("{} hypotheses drafted", new_hypotheses.len()),
    );

    info!(
        count = new_hypotheses.len(),
        iteration = round,
        "Hypothesis generation complete"
    );
}

async fn propose(provider: &dyn GenerationProvider, debate: &DebateRecord) -> String {
    let request = GenerationRequest::new(
        "a Creative Hypothesis Generator, an innovative researcher",
        "Propose one novel, testable research hypothesis addressing the gap below. \
         Take both sides of the debate into account. Answer with the proposal only.",
    )
    .with_context("Gap", &debate.gap)
    .with_context("Arguments for", &debate.pro_arguments)
    .with_context("Arguments against", &debate.con_arguments);

    match provider.generate(&request).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, gap = %debate.gap, "Proposal call failed, recording placeholder");
            UNAVAILABLE_MARKER.to_string()
        }
    }
}
