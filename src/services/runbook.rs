//! Runbook Ingestion
//!
//! Splits markdown runbooks into per-alert chunks and serves them through a
//! deterministic, in-memory [`RetrievalBackend`].
//!
//! A runbook file `<service>.md` is cut on horizontal rules (a line starting
//! with three or more `-`). Each non-empty chunk becomes one document with id
//! `<service>_alert_<index>` and `service_name` metadata equal to the
//! lower-cased file stem.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};

use responder_core::{CoreResult, RetrievalBackend, RetrievedDocument, SimilarityQuery};

use crate::utils::error::{AppError, AppResult};

/// Metadata key holding the chunk id.
pub const CHUNK_ID_KEY: &str = "id";

/// Horizontal-rule separator, compiled once.
fn separator() -> Option<&'static Regex> {
    static SEPARATOR: OnceLock<Option<Regex>> = OnceLock::new();
    SEPARATOR
        .get_or_init(|| Regex::new(r"(?m)^-{3,}").ok())
        .as_ref()
}

/// Split one runbook into documents attributed to `service_key`.
///
/// Chunk indexes count empty chunks too, so ids stay stable when a runbook
/// opens with a rule.
pub fn split_runbook(service_key: &str, content: &str) -> Vec<RetrievedDocument> {
    let raw: Vec<&str> = match separator() {
        Some(re) => re.split(content).collect(),
        None => vec![content],
    };

    raw.into_iter()
        .enumerate()
        .filter_map(|(i, chunk)| {
            let text = chunk.trim();
            (!text.is_empty()).then(|| {
                RetrievedDocument::for_service(text, service_key)
                    .with_metadata(CHUNK_ID_KEY, format!("{}_alert_{}", service_key, i))
            })
        })
        .collect()
}

/// Load every `*.md` runbook in `dir`, sorted by file name.
pub fn load_runbooks(dir: &Path) -> AppResult<Vec<RetrievedDocument>> {
    if !dir.is_dir() {
        return Err(AppError::config(format!(
            "Runbook directory not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!(path = %path.display(), "skipping runbook with a non UTF-8 name");
            continue;
        };
        let service_key = stem.to_lowercase();
        let content = fs::read_to_string(&path)?;
        let chunks = split_runbook(&service_key, &content);
        info!(service = %service_key, alerts = chunks.len(), "ingested runbook");
        documents.extend(chunks);
    }
    Ok(documents)
}

/// In-memory runbook corpus.
///
/// Performs no similarity ranking: chunks come back in ingestion order,
/// restricted by the metadata filter and truncated to `top_k`. The score
/// floor is ignored.
#[derive(Debug, Clone, Default)]
pub struct RunbookLibrary {
    documents: Vec<RetrievedDocument>,
}

impl RunbookLibrary {
    pub fn new(documents: Vec<RetrievedDocument>) -> Self {
        Self { documents }
    }

    pub fn from_dir(dir: &Path) -> AppResult<Self> {
        Ok(Self::new(load_runbooks(dir)?))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl RetrievalBackend for RunbookLibrary {
    fn name(&self) -> &str {
        "runbook-library"
    }

    async fn similarity_search(&self, query: &SimilarityQuery) -> CoreResult<Vec<RetrievedDocument>> {
        Ok(self
            .documents
            .iter()
            .filter(|doc| query.filter.as_ref().map_or(true, |f| f.matches(doc)))
            .take(query.top_k)
            .cloned()
            .collect())
    }
}
