//! Regulatory passage lookup.
//!
//! [`RegulatoryRetriever`] is the capability the audit pipeline consumes. The bundled
//! [`KeywordRegulatoryRetriever`] indexes plain-text documents once at startup and ranks
//! overlapping character chunks by query-term overlap.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::deadline;

pub const NO_RESULTS: &str = "No relevant regulatory references found for this query.";
pub const NOT_AVAILABLE: &str = "Regulatory references not available.";
pub const RETRIEVAL_FAILED: &str = "Regulatory references could not be retrieved.";

const CHUNK_SIZE: usize = 400;
const CHUNK_OVERLAP: usize = 80;
const MIN_CHUNK_CHARS: usize = 30;

const STOPWORDS: [&str; 16] = [
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "has", "have",
    "not", "but", "any", "all",
];

/// Returns relevant passages joined by blank lines, or one of the sentinels. Never fails.
pub trait RegulatoryRetriever: Send + Sync {
    fn retrieve(&self, query: &str, top_k: usize) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("regulatory documents directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
struct Chunk {
    text: String,
    terms: BTreeSet<String>,
}

/// In-memory keyword index over `*.txt` regulatory documents.
#[derive(Debug, Clone, Default)]
pub struct KeywordRegulatoryRetriever {
    chunks: Vec<Chunk>,
}

impl KeywordRegulatoryRetriever {
    /// Index every `*.txt` file in `dir`, in file-name order.
    pub fn load(dir: &Path) -> Result<Self, RetrievalError> {
        if !dir.is_dir() {
            return Err(RetrievalError::MissingDirectory(dir.to_path_buf()));
        }

        let entries = fs::read_dir(dir).map_err(|source| RetrievalError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = fs::read(&path).map_err(|source| RetrievalError::Io {
                path: path.clone(),
                source,
            })?;
            documents.push(String::from_utf8_lossy(&bytes).into_owned());
        }

        let retriever = Self::from_documents(documents);
        info!(
            dir = %dir.display(),
            chunks = retriever.len(),
            "regulatory index loaded"
        );
        Ok(retriever)
    }

    pub fn from_documents<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chunks = documents
            .into_iter()
            .flat_map(|document| chunk_text(document.as_ref()))
            .map(|text| Chunk {
                terms: terms(&text),
                text,
            })
            .collect();
        Self { chunks }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl RegulatoryRetriever for KeywordRegulatoryRetriever {
    fn retrieve(&self, query: &str, top_k: usize) -> String {
        if self.chunks.is_empty() {
            return NOT_AVAILABLE.to_string();
        }

        let query_terms = terms(query);
        let mut ranked: Vec<(usize, usize)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| (chunk.terms.intersection(&query_terms).count(), index))
            .filter(|(overlap, _)| *overlap > 0)
            .collect();
        if ranked.is_empty() {
            return NO_RESULTS.to_string();
        }
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut selected: Vec<&str> = Vec::new();
        for (_, index) in ranked {
            let text = self.chunks[index].text.as_str();
            if !selected.contains(&text) {
                selected.push(text);
            }
            if selected.len() >= top_k {
                break;
            }
        }
        selected.join("\n\n")
    }
}

/// Overlapping character windows; fragments of 30 chars or fewer are dropped.
fn chunk_text(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let step = CHUNK_SIZE - CHUNK_OVERLAP;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + CHUNK_SIZE).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if chunk.chars().count() > MIN_CHUNK_CHARS {
            chunks.push(chunk.to_string());
        }
        start += step;
    }
    chunks
}

fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() >= 3)
        .map(str::to_lowercase)
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
        .collect()
}

/// Run retrieval on the blocking pool with a deadline. Timeouts and panics degrade to
/// [`RETRIEVAL_FAILED`].
pub async fn retrieve_within(
    retriever: &Arc<dyn RegulatoryRetriever>,
    query: String,
    top_k: usize,
    limit: Duration,
) -> String {
    let retriever = Arc::clone(retriever);
    match deadline::run_blocking("regulatory_retrieval", limit, move || {
        retriever.retrieve(&query, top_k)
    })
    .await
    {
        Ok(passages) => passages,
        Err(reason) => {
            warn!(?reason, "regulatory retrieval degraded to placeholder");
            RETRIEVAL_FAILED.to_string()
        }
    }
}
