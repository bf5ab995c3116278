//! Protocol layer — mediated, auditable agent-to-agent transfers.
//!
//! Every inter-stage handoff goes through [`ProtocolLayer::share`], which
//! stores an addressable context envelope and appends an immutable message
//! record to the run's audit log. One layer instance belongs to one
//! analysis run.

mod layer;
mod message;

pub use layer::{ProtocolLayer, ProtocolStats, StoredContext};
pub use message::{MessageRecord, MessageStatus};
