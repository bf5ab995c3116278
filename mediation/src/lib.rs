//! Mediation substrate for the research-gap agent pipeline.
//!
//! Two pieces:
//! - [`privacy`]: a calibrated Laplace mechanism for numeric payloads,
//!   plus the envelope type every transfer is wrapped in.
//! - [`protocol`]: the mediating layer that stores addressable contexts
//!   and keeps the append-only, replayable message log.
//!
//! The layer is an owned instance, constructed per run and passed by
//! handle into each stage rather than held as a process-global singleton,
//! so multi-run isolation is a matter of construction, not locking.

pub mod privacy;
pub mod protocol;

pub use privacy::{ContextEnvelope, Payload, PrivacyError, PrivacyMechanism, PROTOCOL_TAG};
pub use protocol::{MessageRecord, MessageStatus, ProtocolLayer, ProtocolStats, StoredContext};
