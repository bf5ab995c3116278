//! Report generation over the final run state.
//!
//! Consumes the state read-only and renders a human-facing markdown
//! report plus a machine-readable JSON artifact. Table sections are
//! capped the same way the message log itself bounds payloads: the full
//! data lives in the JSON artifact, the markdown shows the head.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use mediation::PROTOCOL_TAG;
use serde_json::json;

use crate::state::RunState;

/// Messages shown in the markdown log table.
const MESSAGE_TABLE_LIMIT: usize = 10;
/// Debates rendered in full in the markdown report.
const DEBATE_LIMIT: usize = 3;

/// Paths of the written report files.
pub struct SavedReports {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

pub struct ReportGenerator {
    generated_at: DateTime<Utc>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
        }
    }

    /// Render the markdown report.
    pub fn markdown(&self, state: &RunState) -> String {
        let mut report = format!(
            "# ContextForge Report\n\
             **Privacy-Preserving Multi-Agent Research Gap Analysis**\n\n\
             Generated: {}\n\
             Protocol: {}\n\n\
             ---\n\n\
             ## Summary\n\n\
             - Documents analyzed: {}\n\
             - Research gaps identified: {}\n\
             - Debates held: {}\n\
             - Hypotheses generated: {}\n\
             - Rounds completed: {}\n\
             - Protocol messages exchanged: {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
            PROTOCOL_TAG,
            state.documents.len(),
            state.gaps.len(),
            state.debates.len(),
            state.hypotheses.len(),
            state.iteration,
            state.mcp_messages.len(),
        );

        report.push_str("## Message Log\n\n");
        if state.mcp_messages.is_empty() {
            report.push_str("No messages logged.\n");
        } else {
            report.push_str("| From | To | Protocol | Privacy | Status |\n");
            report.push_str("|------|----|----------|---------|--------|\n");
            for msg in state.mcp_messages.iter().take(MESSAGE_TABLE_LIMIT) {
                report.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    msg.from_agent, msg.to_agent, msg.protocol, msg.privacy_applied, msg.status
                ));
            }
            if state.mcp_messages.len() > MESSAGE_TABLE_LIMIT {
                report.push_str(&format!(
                    "\n*... and {} more messages*\n",
                    state.mcp_messages.len() - MESSAGE_TABLE_LIMIT
                ));
            }
        }

        report.push_str("\n---\n\n## Identified Research Gaps\n\n");
        for (i, gap) in state.gaps.iter().enumerate() {
            report.push_str(&format!("{}. {}\n", i + 1, gap));
        }

        report.push_str("\n---\n\n## Debates\n\n");
        for (i, debate) in state.debates.iter().take(DEBATE_LIMIT).enumerate() {
            report.push_str(&format!(
                "### Debate {} — {}\n\n**Pro:**\n{}\n\n**Con:**\n{}\n\n",
                i + 1,
                debate.gap,
                debate.pro_arguments,
                debate.con_arguments
            ));
        }

        report.push_str("---\n\n## Ranked Hypotheses\n\n");
        for (i, hypo) in state.final_hypotheses.iter().enumerate() {
            report.push_str(&format!(
                "### Hypothesis {} (score {:.1}/10)\n\n\
                 **Gap:** {}\n\n\
                 **Proposal:** {}\n\n\
                 **Round:** {}\n\n",
                i + 1,
                hypo.score,
                hypo.gap,
                hypo.proposal,
                hypo.iteration
            ));
        }

        report.push_str(&format!(
            "---\n\n## Privacy & Protocol\n\n\
             - Mechanism: Laplace noise on numeric payloads\n\
             - Protocol version: {}\n\
             - Every inter-agent transfer is logged above and addressable \
               by its context id.\n",
            PROTOCOL_TAG
        ));

        report
    }

    /// Build the machine-readable artifact.
    pub fn json_artifact(&self, state: &RunState) -> serde_json::Value {
        json!({
            "metadata": {
                "generated_at": self.generated_at.to_rfc3339(),
                "protocol": PROTOCOL_TAG,
                "iterations": state.iteration,
                "message_count": state.mcp_messages.len(),
            },
            "gaps": state.gaps,
            "hypotheses": state.final_hypotheses,
            "debates": state.debates,
            "mcp_messages": state.mcp_messages,
            "reasoning_trace": state.reasoning_trace,
        })
    }

    /// Write both reports into `dir` with timestamped names.
    pub fn save(&self, state: &RunState, dir: &Path) -> io::Result<SavedReports> {
        fs::create_dir_all(dir)?;
        let stamp = self.generated_at.format("%Y%m%d_%H%M%S");

        let markdown_path = dir.join(format!("contextforge_report_{stamp}.md"));
        fs::write(&markdown_path, self.markdown(state))?;

        let json_path = dir.join(format!("contextforge_artifact_{stamp}.json"));
        let artifact = serde_json::to_string_pretty(&self.json_artifact(state))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&json_path, artifact)?;

        Ok(SavedReports {
            markdown: markdown_path,
            json: json_path,
        })
    }
}
