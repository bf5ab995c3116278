//! Hypothesis scoring, ranking, and the round boundary.

use mediation::{Payload, ProtocolLayer};
use tracing::{info, warn};

use super::TOP_SHARE;
use crate::provider::{GenerationProvider, GenerationRequest};
use crate::score::{parse_score, FALLBACK_SCORE};
use crate::state::{AgentRole, HypothesisRecord, RunState};

/// Score this round's hypotheses and close the round.
///
/// Each hypothesis is scored exactly once, in the round it was drafted.
/// The whole hypothesis history is then re-ranked (stable, descending) so
/// earlier rounds' survivors stay visible to finalize, the iteration
/// counter advances, and the current leaders are announced to the
/// coordinator. The continue/finalize check happens strictly after the
/// increment.
pub async fn run(
    state: &mut RunState,
    provider: &dyn GenerationProvider,
    protocol: &mut ProtocolLayer,
) {
    let round = state.iteration;
    let mut scored = 0usize;

    for i in 0..state.hypotheses.len() {
        if state.hypotheses[i].iteration != round {
            continue;
        }
        let request = scoring_request(&state.hypotheses[i]);
        let score = match provider.generate(&request).await {
            Ok(text) => parse_score(&text),
            Err(e) => {
                warn!(
                    error = %e,
                    gap = %state.hypotheses[i].gap,
                    "Scoring call failed, using fallback score"
                );
                FALLBACK_SCORE
            }
        };
        state.hypotheses[i].score = score;
        scored += 1;
    }

    state.sort_hypotheses();
    state.push_trace(
        AgentRole::EvolutionAgent,
        "evolve_hypotheses",
        format!("{scored} hypotheses scored"),
    );
    state.iteration += 1;

    let top: Vec<HypothesisRecord> = state.hypotheses.iter().take(TOP_SHARE).cloned().collect();
    let payload = Payload::Json(serde_json::to_value(&top).unwrap_or_default());
    let message = protocol.share(
        AgentRole::EvolutionAgent.name(),
        AgentRole::Coordinator.name(),
        payload,
        true,
    );
    state.mcp_messages.push(message);

    info!(
        scored,
        iteration = state.iteration,
        "Evolution pass complete"
    );
}

fn scoring_request(hypothesis: &HypothesisRecord) -> GenerationRequest {
    GenerationRequest::new(
        "a Hypothesis Evolution Specialist, an expert in the scientific method",
        "Rate the research hypothesis below from 0 to 10 for novelty, \
         testability, and impact. Answer with the number first, then one \
         sentence of justification.",
    )
    .with_context("Gap", &hypothesis.gap)
    .with_context("Hypothesis", &hypothesis.proposal)
}
