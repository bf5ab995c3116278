//! Terminal ranking pass.

use tracing::info;

use crate::state::{AgentRole, RunState};

/// Materialize the top-K slice of the globally ranked hypothesis history.
///
/// Runs exactly once, after the last evolution pass. The history is
/// already sorted (every evolution pass re-ranks it), so this is a slice,
/// not a recomputation. No handoff follows; there is no next stage.
pub fn run(state: &mut RunState, top_k: usize) {
    state.final_hypotheses = state.hypotheses.iter().take(top_k).cloned().collect();
    state.push_trace(
        AgentRole::Coordinator,
        "finalize",
        format!("{} hypotheses selected", state.final_hypotheses.len()),
    );

    info!(
        count = state.final_hypotheses.len(),
        total = state.hypotheses.len(),
        "Final ranking materialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::HypothesisRecord;

    fn hypothesis(gap: &str, score: f64) -> HypothesisRecord {
        HypothesisRecord {
            gap: gap.into(),
            proposal: "p".into(),
            iteration: 0,
            score,
        }
    }

    #[test]
    fn test_takes_top_k_in_ranked_order() {
        let mut state = RunState::new(Vec::new(), 1);
        state.hypotheses = vec![
            hypothesis("a", 9.0),
            hypothesis("b", 7.0),
            hypothesis("c", 4.0),
        ];

        run(&mut state, 2);

        assert_eq!(state.final_hypotheses.len(), 2);
        assert_eq!(state.final_hypotheses[0].gap, "a");
        assert_eq!(state.final_hypotheses[1].gap, "b");
        assert_eq!(state.reasoning_trace.len(), 1);
        assert_eq!(state.reasoning_trace[0].action, "finalize");
    }

    #[test]
    fn test_short_history_yields_short_slice() {
        let mut state = RunState::new(Vec::new(), 1);
        state.hypotheses = vec![hypothesis("only", 5.0)];

        run(&mut state, 5);

        assert_eq!(state.final_hypotheses.len(), 1);
    }
}
