//! Multi-agent research-gap pipeline.
//!
//! Four cooperating stage handlers (detect → debate → generate → evolve)
//! progressively transform a document corpus into ranked research
//! hypotheses. Every inter-stage handoff passes through the `mediation`
//! protocol layer, which records a replayable message log and perturbs
//! numeric payloads with a Laplace mechanism before they leave the
//! producing stage.
//!
//! The orchestrator loops the stage sequence until the configured round
//! budget is spent, then finalizes exactly once with the top-ranked
//! hypotheses from the whole run.

pub mod config;
pub mod documents;
pub mod orchestrator;
pub mod provider;
pub mod report;
pub mod score;
pub mod stages;
pub mod state;
pub mod state_machine;

pub use config::{ConfigError, ForgeConfig};
pub use documents::{DocumentIngestor, DocumentRecord, Embedder, IngestError};
pub use orchestrator::Orchestrator;
pub use provider::{GenerationProvider, GenerationRequest, OllamaProvider, ProviderError};
pub use report::{ReportGenerator, SavedReports};
pub use state::{AgentRole, DebateRecord, HypothesisRecord, RunState, TraceEntry};
pub use state_machine::{IllegalTransition, PipelineStage, StageMachine, TransitionRecord};
