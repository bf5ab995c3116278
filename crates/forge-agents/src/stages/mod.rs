//! Stage handlers for the research-gap pipeline.
//!
//! Each handler consumes the shared run state, produces its artifact via
//! the generation collaborator, pushes the artifact through the protocol
//! layer to the next stage, and appends exactly one reasoning-trace
//! entry. Generation failures are absorbed at the stage boundary: a
//! stage degrades to its documented fallback instead of aborting the
//! round.

pub mod debater;
pub mod detector;
pub mod evolver;
pub mod finalize;
pub mod generator;

/// Most gaps retained from one detection pass.
pub const MAX_GAPS: usize = 5;
/// Shortest line kept by gap extraction; anything at or below is noise.
pub const MIN_GAP_LEN: usize = 5;
/// Gaps debated per round.
pub const DEBATE_FANOUT: usize = 3;
/// Hypotheses announced to the coordinator after each evolution pass.
pub const TOP_SHARE: usize = 3;
/// Per-document preview length fed to the detector prompt.
pub const DOC_PREVIEW_LEN: usize = 500;
/// Substituted for an argument or proposal when its generation call fails.
pub const UNAVAILABLE_MARKER: &str = "[generation unavailable]";
/// Fallback gap set when extraction yields nothing.
pub const DEFAULT_GAPS: [&str; 3] = [
    "Limited evaluation methods",
    "Scalability issues",
    "Privacy concerns",
];
