//! Gap detection — the first stage of every round.

use mediation::{Payload, ProtocolLayer};
use serde_json::json;
use tracing::{info, warn};

use super::{DEFAULT_GAPS, DOC_PREVIEW_LEN, MAX_GAPS, MIN_GAP_LEN};
use crate::provider::{GenerationProvider, GenerationRequest};
use crate::state::{AgentRole, RunState};

/// Detect research gaps from the run's documents.
///
/// Falls back to a fixed generic gap set when the collaborator fails or
/// extraction yields nothing, so the pipeline never stalls here.
pub async fn run(
    state: &mut RunState,
    provider: &dyn GenerationProvider,
    protocol: &mut ProtocolLayer,
    research_goal: &str,
) {
    let docs_text = document_previews(state);
    let request = detection_request(&docs_text, research_goal);

    let gaps = match provider.generate(&request).await {
        Ok(text) => {
            let extracted = extract_gaps(&text);
            if extracted.is_empty() {
                warn!("Gap extraction yielded nothing, using fallback set");
                fallback_gaps()
            } else {
                extracted
            }
        }
        Err(e) => {
            warn!(error = %e, "Gap detection call failed, using fallback set");
            fallback_gaps()
        }
    };

    state.gaps = gaps.clone();
    let message = protocol.share(
        AgentRole::GapDetector.name(),
        AgentRole::Debater.name(),
        Payload::Json(json!({ "gaps": gaps })),
        true,
    );
    state.mcp_messages.push(message);
    state.push_trace(
        AgentRole::GapDetector,
        "detect_gaps",
        format!("{} gaps identified", state.gaps.len()),
    );

    info!(
        count = state.gaps.len(),
        iteration = state.iteration,
        "Gap detection complete"
    );
}

/// Bounded previews keep the prompt size independent of document length.
fn document_previews(state: &RunState) -> String {
    state
        .documents
        .iter()
        .map(|d| d.full_text.chars().take(DOC_PREVIEW_LEN).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn detection_request(docs_text: &str, research_goal: &str) -> GenerationRequest {
    let mut request = GenerationRequest::new(
        "a Research Gap Detector, an expert analyst of research literature",
        "Identify up to five underexplored research gaps in the documents below. \
         State one gap per line, no numbering, no preamble.",
    )
    .with_context("Documents", docs_text);

    if !research_goal.is_empty() {
        request = request.with_context("Research goal", research_goal);
    }
    request
}

/// Split a response into candidate gaps: non-empty lines above the noise
/// threshold, at most [`MAX_GAPS`].
fn extract_gaps(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.len() > MIN_GAP_LEN)
        .take(MAX_GAPS)
        .map(String::from)
        .collect()
}

fn fallback_gaps() -> Vec<String> {
    DEFAULT_GAPS.iter().map(|g| g.to_string()).collect()
}
