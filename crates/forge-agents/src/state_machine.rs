//! Pipeline state machine — explicit stages and legal transition guards.
//!
//! The orchestrator loop calls `advance()` to move between stages. Each
//! call validates the transition against the stage graph and records it,
//! so a finished run carries a replayable account of its own sequencing.
//!
//! ```text
//! Detect → Debate → Generate → Evolve ─┬─ budget left → Detect
//!                                      └─ budget spent → Finalize
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// The set of pipeline stages.
///
/// Every run starts at `Detect` and terminates at `Finalize`; the only
/// branch point is the continue/finalize decision after `Evolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Scanning documents for research gaps.
    Detect,
    /// Arguing pro and con cases for each gap.
    Debate,
    /// Drafting hypotheses from the debated gaps.
    Generate,
    /// Scoring and ranking hypotheses — the round boundary.
    Evolve,
    /// Materializing the final ranking — terminal.
    Finalize,
}

impl PipelineStage {
    /// Whether this is a terminal stage (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalize)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detect => write!(f, "detect"),
            Self::Debate => write!(f, "debate"),
            Self::Generate => write!(f, "generate"),
            Self::Evolve => write!(f, "evolve"),
            Self::Finalize => write!(f, "finalize"),
        }
    }
}

fn is_legal_transition(from: PipelineStage, to: PipelineStage) -> bool {
    use PipelineStage::*;

    matches!(
        (from, to),
        (Detect, Debate)
            | (Debate, Generate)
            | (Generate, Evolve)
            // After evolving: loop back for another round, or finalize
            | (Evolve, Detect)
            | (Evolve, Finalize)
    )
}

/// A single recorded stage transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: PipelineStage,
    pub to: PipelineStage,
    /// Completed rounds at the time of transition.
    pub iteration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error returned when an illegal transition is attempted.
#[derive(Debug, Clone)]
pub struct IllegalTransition {
    pub from: PipelineStage,
    pub to: PipelineStage,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal stage transition: {} → {}", self.from, self.to)
    }
}

impl std::error::Error for IllegalTransition {}

/// Tracks the current stage, enforces legal transitions, and keeps the
/// full transition log.
pub struct StageMachine {
    current: PipelineStage,
    transitions: Vec<TransitionRecord>,
}

impl StageMachine {
    /// Create a new machine starting at `Detect`.
    pub fn new() -> Self {
        Self {
            current: PipelineStage::Detect,
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> PipelineStage {
        self.current
    }

    /// Attempt to advance to the next stage.
    pub fn advance(
        &mut self,
        to: PipelineStage,
        iteration: u32,
        reason: Option<&str>,
    ) -> Result<(), IllegalTransition> {
        if !is_legal_transition(self.current, to) {
            return Err(IllegalTransition {
                from: self.current,
                to,
            });
        }

        tracing::debug!(
            from = %self.current,
            to = %to,
            iteration,
            "Stage transition"
        );

        self.transitions.push(TransitionRecord {
            from: self.current,
            to,
            iteration,
            reason: reason.map(String::from),
        });
        self.current = to;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }
}

impl Default for StageMachine {
    fn default() -> Self {
        Self::new()
    }
}
