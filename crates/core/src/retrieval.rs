//! Retrieval Backend Contract
//!
//! Types exchanged with the external similarity-search backend. The core
//! never computes embeddings or similarity itself; it only shapes queries and
//! consumes the documents a backend returns.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;

/// Metadata key carrying the owning service of a document.
pub const SERVICE_NAME_KEY: &str = "service_name";

/// A runbook fragment returned by the retrieval backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RetrievedDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Convenience for documents attributed to a service.
    pub fn for_service(text: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self::new(text).with_metadata(SERVICE_NAME_KEY, service_key)
    }

    /// The service this document is attributed to, if recorded.
    pub fn service_name(&self) -> Option<&str> {
        self.metadata.get(SERVICE_NAME_KEY).map(String::as_str)
    }
}

/// Equality filter on a single metadata key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub key: String,
    pub value: String,
}

impl MetadataFilter {
    /// Filter restricting `service_name` to the given (already normalized) key.
    pub fn service(service_key: impl Into<String>) -> Self {
        Self {
            key: SERVICE_NAME_KEY.to_string(),
            value: service_key.into(),
        }
    }

    /// Backend filter expression, e.g. `service_name == 'payment-service'`.
    pub fn expression(&self) -> String {
        format!("{} == '{}'", self.key, self.value.replace('\'', "\\'"))
    }

    /// Local re-check against a document's metadata.
    pub fn matches(&self, doc: &RetrievedDocument) -> bool {
        doc.metadata.get(&self.key) == Some(&self.value)
    }
}

/// A similarity query as sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityQuery {
    pub query: String,
    pub top_k: usize,
    /// Score floor; `None` means no floor.
    pub min_score: Option<f32>,
    pub filter: Option<MetadataFilter>,
}

/// Contract of the external similarity-search backend.
///
/// Implementations must be deterministic for a fixed corpus and must
/// preserve document metadata. Backend-side filter support is not assumed to
/// be exact; callers re-check [`MetadataFilter::matches`] locally.
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    async fn similarity_search(&self, query: &SimilarityQuery)
        -> CoreResult<Vec<RetrievedDocument>>;
}
