//! Document ingestion boundary.
//!
//! The pipeline only cares about the record shape: an identifier, a text
//! body, and a chunk list. The ingester handles plain-text sources
//! directly and rejects anything richer per document, so one unreadable
//! file never sinks a batch. Embedding is an external concern behind the
//! [`Embedder`] trait; when supplied, chunk embeddings are perturbed by
//! the privacy mechanism before they are stored.

use std::fs;
use std::path::{Path, PathBuf};

use mediation::PrivacyMechanism;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// External embedding model boundary: text in, float vector out.
pub trait Embedder {
    fn embed(&self, text: &str) -> Vec<f64>;
}

/// A processed document as the pipeline consumes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub identifier: String,
    pub full_text: String,
    pub chunks: Vec<String>,
    pub chunk_count: usize,
    /// Perturbed chunk embeddings, present when an embedder was supplied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeddings: Vec<Vec<f64>>,
}

/// Splits documents into overlapping character windows.
pub struct DocumentIngestor {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for DocumentIngestor {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

impl DocumentIngestor {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    /// Load and chunk a single document.
    ///
    /// Only plain-text formats are handled here; anything else is a
    /// per-document rejection for the caller to report.
    pub fn ingest_path(&self, path: &Path) -> Result<DocumentRecord, IngestError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let text = match ext.as_str() {
            "txt" | "md" => fs::read_to_string(path).map_err(|source| IngestError::Io {
                path: path.display().to_string(),
                source,
            })?,
            _ => {
                return Err(IngestError::UnsupportedFormat(path.display().to_string()));
            }
        };

        let identifier = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        Ok(self.ingest_text(&identifier, &text))
    }

    /// Build a record from raw text.
    pub fn ingest_text(&self, identifier: &str, text: &str) -> DocumentRecord {
        let chunks = self.chunk_text(text);
        debug!(identifier, chunks = chunks.len(), "Document ingested");
        DocumentRecord {
            identifier: identifier.to_string(),
            full_text: text.to_string(),
            chunk_count: chunks.len(),
            chunks,
            embeddings: Vec::new(),
        }
    }

    /// Window the text into chunks of `chunk_size` characters with
    /// `chunk_overlap` characters shared between neighbours.
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let step = self.chunk_size.saturating_sub(self.chunk_overlap).max(1);
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }

    /// Ingest a batch with partial-failure semantics: rejected documents
    /// are returned alongside the successes instead of aborting the rest.
    pub fn ingest_batch(&self, paths: &[PathBuf]) -> (Vec<DocumentRecord>, Vec<IngestError>) {
        let mut records = Vec::new();
        let mut rejected = Vec::new();
        for path in paths {
            match self.ingest_path(path) {
                Ok(record) => records.push(record),
                Err(e) => rejected.push(e),
            }
        }
        (records, rejected)
    }

    /// Attach DP-perturbed chunk embeddings to a record.
    pub fn attach_embeddings(
        &self,
        record: &mut DocumentRecord,
        embedder: &dyn Embedder,
        privacy: &PrivacyMechanism,
    ) {
        let raw: Vec<Vec<f64>> = record.chunks.iter().map(|c| embedder.embed(c)).collect();
        record.embeddings = privacy.perturb_batch(&raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedEmbedder;

    impl Embedder for FixedEmbedder {
        fn embed(&self, text: &str) -> Vec<f64> {
            vec![text.len() as f64, 1.0]
        }
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let ingestor = DocumentIngestor::new(100, 20);
        let record = ingestor.ingest_text("short.txt", "a small document");

        assert_eq!(record.chunk_count, 1);
        assert_eq!(record.chunks[0], "a small document");
        assert_eq!(record.identifier, "short.txt");
    }

    #[test]
    fn test_chunks_overlap() {
        let ingestor = DocumentIngestor::new(10, 4);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = ingestor.chunk_text(text);

        assert!(chunks.len() > 1);
        assert_eq!(chunks[0], "abcdefghij");
        // Next chunk starts chunk_size - overlap = 6 characters in.
        assert!(chunks[1].starts_with("ghij"));
        // Every character of the source appears in some chunk.
        let joined: String = chunks.concat();
        assert!(joined.contains("xyz"));
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let ingestor = DocumentIngestor::default();
        assert!(ingestor.chunk_text("   \n  ").is_empty());
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        let ingestor = DocumentIngestor::default();
        let err = ingestor.ingest_path(Path::new("paper.pdf")).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_batch_continues_past_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let mut f = fs::File::create(&good).unwrap();
        writeln!(f, "Privacy in AI. Gap: limited longitudinal studies.").unwrap();

        let paths = vec![
            good.clone(),
            dir.path().join("bad.pdf"),
            dir.path().join("missing.txt"),
        ];

        let (records, rejected) = DocumentIngestor::default().ingest_batch(&paths);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "good.txt");
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn test_attached_embeddings_are_perturbed() {
        let ingestor = DocumentIngestor::default();
        let privacy = PrivacyMechanism::new(1.0, 1.0).unwrap();
        let mut record = ingestor.ingest_text("doc", "some text to embed");

        ingestor.attach_embeddings(&mut record, &FixedEmbedder, &privacy);

        assert_eq!(record.embeddings.len(), record.chunk_count);
        assert_eq!(record.embeddings[0].len(), 2);
        // Laplace noise moved the values off the embedder's output.
        assert_ne!(record.embeddings[0][1], 1.0);
    }
}
