//! Log Search Probe
//!
//! Adapts the embedded log store to the `searchElfLogs` tool contract.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use responder_logstore::LogStore;

/// Pods reported for any non-empty match set.
const SIMULATED_PODS: [&str; 2] = ["simulated-pod-1", "simulated-pod-2"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLogsRequest {
    pub query: String,
    /// Accepted for contract compatibility; the simulated store has no clock.
    #[serde(default, alias = "time_window", skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLogsResponse {
    pub match_count: usize,
    pub sample_trace_ids: Vec<String>,
    pub affected_pods: Vec<String>,
    pub summary: String,
}

/// The `searchElfLogs` tool.
#[derive(Clone)]
pub struct SearchLogsTool {
    store: Arc<LogStore>,
}

impl SearchLogsTool {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }

    pub fn search(&self, request: &SearchLogsRequest) -> SearchLogsResponse {
        info!(query = %request.query, time_window = ?request.time_window, "searching logs");
        let results = self.store.query(&request.query);

        if let Some(error) = &results.error {
            return SearchLogsResponse {
                match_count: 0,
                sample_trace_ids: Vec::new(),
                affected_pods: Vec::new(),
                summary: format!("Query Error: {}", error),
            };
        }

        let affected_pods = if results.total_hits > 0 {
            SIMULATED_PODS.iter().map(|p| p.to_string()).collect()
        } else {
            Vec::new()
        };

        SearchLogsResponse {
            match_count: results.total_hits,
            sample_trace_ids: results.trace_ids(),
            affected_pods,
            summary: format!(
                "Found {} matches for query: {}",
                results.total_hits, request.query
            ),
        }
    }
}
