//! Shared run state threaded through the pipeline.
//!
//! One `RunState` per analysis. The growing sequences (`debates`,
//! `hypotheses`, `mcp_messages`, `reasoning_trace`) are append-only;
//! anything that needs "this round's" items matches on the `iteration`
//! tag rather than slicing, so insertion order must be preserved.

use mediation::MessageRecord;
use serde::{Deserialize, Serialize};

use crate::documents::DocumentRecord;

/// The actors named in the message log and reasoning trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentRole {
    GapDetector,
    Debater,
    HypothesisGenerator,
    EvolutionAgent,
    Coordinator,
}

impl AgentRole {
    pub const ALL: [AgentRole; 5] = [
        Self::GapDetector,
        Self::Debater,
        Self::HypothesisGenerator,
        Self::EvolutionAgent,
        Self::Coordinator,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::GapDetector => "GapDetector",
            Self::Debater => "Debater",
            Self::HypothesisGenerator => "HypothesisGenerator",
            Self::EvolutionAgent => "EvolutionAgent",
            Self::Coordinator => "Coordinator",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One debated gap with its pro and con cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateRecord {
    pub gap: String,
    pub pro_arguments: String,
    pub con_arguments: String,
    /// Round this debate was held in.
    pub iteration: u32,
}

/// A candidate research hypothesis.
///
/// `score` starts at 0 and is written exactly once, by the evolution
/// stage of the round that produced the hypothesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypothesisRecord {
    pub gap: String,
    pub proposal: String,
    pub iteration: u32,
    pub score: f64,
}

/// One reasoning-trace entry per stage invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub agent: String,
    pub action: String,
    pub output_summary: String,
    pub iteration: u32,
}

/// Mutable state for one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    pub documents: Vec<DocumentRecord>,
    /// Gaps from the most recent detection pass.
    pub gaps: Vec<String>,
    pub debates: Vec<DebateRecord>,
    /// Re-sorted descending by score after every evolution pass.
    pub hypotheses: Vec<HypothesisRecord>,
    /// Top-K slice, materialized once at finalize.
    pub final_hypotheses: Vec<HypothesisRecord>,
    /// Completed rounds. Incremented exactly once per round, inside the
    /// evolution stage, before the continue/finalize check.
    pub iteration: u32,
    pub max_iterations: u32,
    /// Complete audit trail: one record per successful handoff.
    pub mcp_messages: Vec<MessageRecord>,
    pub reasoning_trace: Vec<TraceEntry>,
}

impl RunState {
    pub fn new(documents: Vec<DocumentRecord>, max_iterations: u32) -> Self {
        Self {
            documents,
            max_iterations,
            ..Self::default()
        }
    }

    /// Stable re-sort of the full hypothesis history, best first.
    ///
    /// Stability keeps insertion order among equal scores, so earlier
    /// rounds' survivors stay visible to finalize in a deterministic
    /// order. Scores are clamped upstream, so the comparison is total.
    pub fn sort_hypotheses(&mut self) {
        self.hypotheses.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    pub fn push_trace(&mut self, agent: AgentRole, action: &str, output_summary: String) {
        self.reasoning_trace.push(TraceEntry {
            agent: agent.name().to_string(),
            action: action.to_string(),
            output_summary,
            iteration: self.iteration,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hypothesis(gap: &str, iteration: u32, score: f64) -> HypothesisRecord {
        HypothesisRecord {
            gap: gap.into(),
            proposal: format!("proposal for {gap}"),
            iteration,
            score,
        }
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = RunState::new(Vec::new(), 3);
        assert_eq!(state.iteration, 0);
        assert_eq!(state.max_iterations, 3);
        assert!(state.gaps.is_empty());
        assert!(state.hypotheses.is_empty());
        assert!(state.mcp_messages.is_empty());
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let mut state = RunState::new(Vec::new(), 1);
        state.hypotheses = vec![
            hypothesis("a", 0, 4.0),
            hypothesis("b", 0, 9.0),
            hypothesis("c", 0, 4.0),
            hypothesis("d", 1, 7.0),
        ];

        state.sort_hypotheses();

        let order: Vec<&str> = state.hypotheses.iter().map(|h| h.gap.as_str()).collect();
        // "a" stays ahead of "c" among the 4.0 ties.
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_trace_tags_current_iteration() {
        let mut state = RunState::new(Vec::new(), 2);
        state.push_trace(AgentRole::GapDetector, "detect_gaps", "3 gaps".into());
        state.iteration = 1;
        state.push_trace(AgentRole::Debater, "debate_gaps", "2 debates".into());

        assert_eq!(state.reasoning_trace[0].iteration, 0);
        assert_eq!(state.reasoning_trace[0].agent, "GapDetector");
        assert_eq!(state.reasoning_trace[1].iteration, 1);
    }

    #[test]
    fn test_role_names() {
        assert_eq!(AgentRole::GapDetector.to_string(), "GapDetector");
        assert_eq!(AgentRole::EvolutionAgent.name(), "EvolutionAgent");
        assert_eq!(AgentRole::ALL.len(), 5);
    }
}
