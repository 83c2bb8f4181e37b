//! Context Retriever
//!
//! Fetches grounding documents for an incident from a retrieval backend,
//! restricting them to the requested service when the filter policy asks
//! for it.

use std::sync::Arc;

use tracing::debug;

use responder_core::{
    AgentConfig, IncidentRequest, MetadataFilter, RetrievalBackend, RetrievedDocument,
    SimilarityQuery,
};

use crate::models::settings::FilterPolicy;
use crate::utils::error::AppResult;

#[derive(Clone)]
pub struct ContextRetriever {
    backend: Arc<dyn RetrievalBackend>,
    policy: FilterPolicy,
}

impl ContextRetriever {
    pub fn new(backend: Arc<dyn RetrievalBackend>, policy: FilterPolicy) -> Self {
        Self { backend, policy }
    }

    /// Whether this request's documents must be attributed to its service.
    ///
    /// Under strict filtering an empty service key still filters, so nothing
    /// unattributed can slip through.
    pub fn requires_filter(&self, request: &IncidentRequest, config: &AgentConfig) -> bool {
        config.strict_metadata_filtering
            || (self.policy == FilterPolicy::Mandatory && !request.service_key().is_empty())
    }

    pub fn build_query(&self, request: &IncidentRequest, config: &AgentConfig) -> SimilarityQuery {
        SimilarityQuery {
            query: request.issue.clone(),
            top_k: config.top_k,
            min_score: (config.min_score > 0.0).then_some(config.min_score),
            filter: self
                .requires_filter(request, config)
                .then(|| MetadataFilter::service(request.service_key())),
        }
    }

    /// Retrieve grounding documents. An empty result is a valid outcome;
    /// backend failures propagate.
    pub async fn retrieve(
        &self,
        request: &IncidentRequest,
        config: &AgentConfig,
    ) -> AppResult<Vec<RetrievedDocument>> {
        let query = self.build_query(request, config);
        let documents = self.backend.similarity_search(&query).await?;
        let returned = documents.len();

        // Backend filter support is best effort; re-check every document.
        let documents: Vec<RetrievedDocument> = match &query.filter {
            Some(filter) => documents.into_iter().filter(|d| filter.matches(d)).collect(),
            None => documents,
        };

        debug!(
            backend = self.backend.name(),
            filter = ?query.filter.as_ref().map(MetadataFilter::expression),
            returned,
            kept = documents.len(),
            "retrieved grounding documents"
        );

        Ok(documents)
    }
}
