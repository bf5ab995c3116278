//! Debate — pro and con cases for each detected gap.

use mediation::{Payload, ProtocolLayer};
use tracing::{info, warn};

use super::{DEBATE_FANOUT, UNAVAILABLE_MARKER};
use crate::provider::{GenerationProvider, GenerationRequest};
use crate::state::{AgentRole, DebateRecord, RunState};

#[derive(Clone, Copy)]
enum Stance {
    Pro,
    Con,
}

/// Debate the current gap set.
///
/// Fan-out is capped at [`DEBATE_FANOUT`] gaps to bound cost. A failed
/// argument call records a placeholder marker for that side and the
/// debate still goes ahead.
pub async fn run(
    state: &mut RunState,
    provider: &dyn GenerationProvider,
    protocol: &mut ProtocolLayer,
) {
    let round = state.iteration;
    let mut new_debates = Vec::new();

    for gap in state.gaps.iter().take(DEBATE_FANOUT) {
        let pro_arguments = argue(provider, gap, Stance::Pro).await;
        let con_arguments = argue(provider, gap, Stance::Con).await;
        new_debates.push(DebateRecord {
            gap: gap.clone(),
            pro_arguments,
            con_arguments,
            iteration: round,
        });
    }

    state.debates.extend(new_debates.iter().cloned());

    let payload = Payload::Json(serde_json::to_value(&new_debates).unwrap_or_default());
    let message = protocol.share(
        AgentRole::Debater.name(),
        AgentRole::HypothesisGenerator.name(),
        payload,
        true,
    );
    state.mcp_messages.push(message);
    state.push_trace(
        AgentRole::Debater,
        "debate_gaps",
        format!("{} debates held", new_debates.len()),
    );

    info!(
        count = new_debates.len(),
        iteration = round,
        "Debate stage complete"
    );
}

async fn argue(provider: &dyn GenerationProvider, gap: &str, stance: Stance) -> String {
    let instruction = match stance {
        Stance::Pro => {
            "Make the strongest case FOR prioritizing research on the gap below, \
             in two or three sentences."
        }
        Stance::Con => {
            "Make the strongest case AGAINST prioritizing research on the gap below, \
             in two or three sentences. Focus on methodological weaknesses."
        }
    };

    let request = GenerationRequest::new("a Critical Debater playing devil's advocate", instruction)
        .with_context("Gap", gap);

    match provider.generate(&request).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, gap, "Argument call failed, recording placeholder");
            UNAVAILABLE_MARKER.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::{protocol, FailingProvider, StaticProvider};

    fn state_with_gaps(gaps: &[&str]) -> RunState {
        let mut state = RunState::new(Vec::new(), 1);
        state.gaps = gaps.iter().map(|g| g.to_string()).collect();
        state
    }

    #[tokio::test]
    async fn test_debates_capped_and_tagged() {
        let mut state = state_with_gaps(&["g1", "g2", "g3", "g4", "g5"]);
        state.iteration = 2;
        let mut protocol = protocol();
        let provider = StaticProvider("A convincing argument.".into());

        run(&mut state, &provider, &mut protocol).await;

        assert_eq!(state.debates.len(), DEBATE_FANOUT);
        assert!(state.debates.iter().all(|d| d.iteration == 2));
        assert_eq!(state.debates[0].pro_arguments, "A convincing argument.");
        assert_eq!(state.mcp_messages.len(), 1);
        assert_eq!(state.mcp_messages[0].to_agent, "HypothesisGenerator");
        assert_eq!(state.reasoning_trace.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_arguments_become_placeholders() {
        let mut state = state_with_gaps(&["g1"]);
        let mut protocol = protocol();

        run(&mut state, &FailingProvider, &mut protocol).await;

        assert_eq!(state.debates.len(), 1);
        assert_eq!(state.debates[0].pro_arguments, UNAVAILABLE_MARKER);
        assert_eq!(state.debates[0].con_arguments, UNAVAILABLE_MARKER);
        // The stage still hands off to the generator.
        assert_eq!(state.mcp_messages.len(), 1);
    }

    #[tokio::test]
    async fn test_no_gaps_means_empty_batch() {
        let mut state = state_with_gaps(&[]);
        let mut protocol = protocol();
        let provider = StaticProvider("unused".into());

        run(&mut state, &provider, &mut protocol).await;

        assert!(state.debates.is_empty());
        // An empty batch is still an explicit handoff.
        assert_eq!(state.mcp_messages.len(), 1);
    }
}
