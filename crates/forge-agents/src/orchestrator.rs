//! Pipeline orchestration — drives the stage sequence to completion.
//!
//! One orchestrator owns one protocol layer instance for the lifetime of
//! one analysis run; concurrent runs each construct their own. The loop
//! is bounded: `max_iterations` rounds of detect → debate → generate →
//! evolve, then finalize exactly once.

use anyhow::Result;
use mediation::{PrivacyMechanism, ProtocolLayer, ProtocolStats};
use tracing::info;

use crate::config::ForgeConfig;
use crate::documents::DocumentRecord;
use crate::provider::GenerationProvider;
use crate::stages;
use crate::state::{AgentRole, RunState};
use crate::state_machine::{PipelineStage, StageMachine};

pub struct Orchestrator<P: GenerationProvider> {
    provider: P,
    protocol: ProtocolLayer,
    config: ForgeConfig,
}

impl<P: GenerationProvider> Orchestrator<P> {
    pub fn new(provider: P, config: ForgeConfig) -> Result<Self> {
        config.validate()?;
        let privacy = PrivacyMechanism::new(config.epsilon, config.sensitivity)?;
        let mut protocol = ProtocolLayer::new(privacy);
        for role in AgentRole::ALL {
            protocol.register(role.name());
        }

        Ok(Self {
            provider,
            protocol,
            config,
        })
    }

    /// Run the full analysis over the given documents.
    ///
    /// Returns the final run state including the complete message log and
    /// reasoning trace. Stage-level generation failures degrade to their
    /// documented fallbacks; only an illegal stage transition (a bug, not
    /// an input condition) surfaces as an error.
    pub async fn run(
        &mut self,
        documents: Vec<DocumentRecord>,
        research_goal: &str,
    ) -> Result<RunState> {
        let mut state = RunState::new(documents, self.config.max_iterations);
        let mut machine = StageMachine::new();

        info!(
            documents = state.documents.len(),
            max_iterations = state.max_iterations,
            epsilon = self.config.epsilon,
            "Starting multi-agent analysis"
        );

        loop {
            stages::detector::run(&mut state, &self.provider, &mut self.protocol, research_goal)
                .await;
            machine.advance(PipelineStage::Debate, state.iteration, None)?;

            stages::debater::run(&mut state, &self.provider, &mut self.protocol).await;
            machine.advance(PipelineStage::Generate, state.iteration, None)?;

            stages::generator::run(&mut state, &self.provider, &mut self.protocol).await;
            machine.advance(PipelineStage::Evolve, state.iteration, None)?;

            // Advances state.iteration; the check below must come after.
            stages::evolver::run(&mut state, &self.provider, &mut self.protocol).await;

            if state.iteration >= state.max_iterations {
                machine.advance(
                    PipelineStage::Finalize,
                    state.iteration,
                    Some("iteration budget reached"),
                )?;
                break;
            }
            machine.advance(
                PipelineStage::Detect,
                state.iteration,
                Some("budget remaining, next round"),
            )?;
        }

        stages::finalize::run(&mut state, self.config.top_k);

        info!(
            gaps = state.gaps.len(),
            debates = state.debates.len(),
            hypotheses = state.hypotheses.len(),
            finalists = state.final_hypotheses.len(),
            messages = state.mcp_messages.len(),
            iterations = state.iteration,
            "Analysis complete"
        );

        Ok(state)
    }

    /// Read access to the owned protocol layer (audit, tests).
    pub fn protocol(&self) -> &ProtocolLayer {
        &self.protocol
    }

    /// Aggregate statistics from the owned protocol layer.
    pub fn protocol_stats(&self) -> ProtocolStats {
        self.protocol.stats()
    }

    /// Clear the protocol log and context store for an independent rerun.
    pub fn reset_protocol(&mut self) {
        self.protocol.reset();
    }
}
