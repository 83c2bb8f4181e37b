//! Incident Data Model
//!
//! The request, per-run configuration, and terminal verdict types shared by
//! every layer of the responder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Time window used when a request does not specify one.
pub const DEFAULT_TIME_WINDOW: &str = "1h";

/// `failureType` reported by every fallback verdict.
pub const FALLBACK_FAILURE_TYPE: &str = "AGENT_FAILURE";

/// Team that owns fallback verdicts.
pub const ON_CALL_TEAM: &str = "SRE-OnCall";

/// Normalize a free-form service name into the key used for metadata
/// attribution: trimmed, lower-cased, spaces replaced with hyphens.
pub fn normalize_service_key(service_name: &str) -> String {
    service_name.trim().to_lowercase().replace(' ', "-")
}

/// An incident to diagnose. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRequest {
    /// Name of the affected service, as the reporter wrote it
    pub service_name: String,
    /// Symptom description (error text, alert body, ...)
    pub issue: String,
    /// Look-back window for log searches (e.g. "1h")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
}

impl IncidentRequest {
    pub fn new(service_name: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            issue: issue.into(),
            time_window: None,
        }
    }

    pub fn with_time_window(mut self, window: impl Into<String>) -> Self {
        self.time_window = Some(window.into());
        self
    }

    /// The effective time window, falling back to [`DEFAULT_TIME_WINDOW`].
    pub fn time_window(&self) -> &str {
        self.time_window
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .unwrap_or(DEFAULT_TIME_WINDOW)
    }

    /// Normalized service key for metadata filtering.
    pub fn service_key(&self) -> String {
        normalize_service_key(&self.service_name)
    }
}

/// Parameters governing a single analysis run.
///
/// Used to A/B test retrieval precision against recall. Construct with
/// [`AgentConfig::default`] or [`crate::AgentConfigBuilder`]; never mutated
/// once a run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Number of documents to request from the retrieval backend
    pub top_k: usize,
    /// Similarity floor in `[0, 1]`; `0` disables the floor
    pub min_score: f32,
    /// Model sampling temperature in `[0, 1]`
    pub temperature: f32,
    /// Restrict grounding material to the requested service
    pub strict_metadata_filtering: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            top_k: 2,
            min_score: 0.0,
            temperature: 0.0,
            strict_metadata_filtering: false,
        }
    }
}

/// The terminal verdict of an analysis run.
///
/// Every field is always present on the wire; empty strings and collections
/// stand in for missing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// Name of the alert the diagnosis matched
    pub failure_type: String,
    pub root_cause_hypothesis: String,
    /// Log query used (or recommended) to confirm the diagnosis
    pub investigation_query: String,
    /// Tool name -> observed result summary
    pub evidence: Map<String, Value>,
    pub responsible_team: String,
    pub remediation_steps: Vec<String>,
    pub requires_escalation: bool,
    /// Service attributions of the grounding documents, set by the orchestrator
    pub citations: Vec<String>,
}

impl AnalysisResponse {
    /// Deterministic verdict used whenever the agent cannot produce one.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            failure_type: FALLBACK_FAILURE_TYPE.to_string(),
            root_cause_hypothesis: reason.into(),
            investigation_query: "N/A".to_string(),
            evidence: Map::new(),
            responsible_team: ON_CALL_TEAM.to_string(),
            remediation_steps: vec!["Escalate to human operator.".to_string()],
            requires_escalation: true,
            citations: Vec::new(),
        }
    }

    /// Replace the citations with the given attributions.
    pub fn with_citations(mut self, citations: Vec<String>) -> Self {
        self.citations = citations;
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.failure_type == FALLBACK_FAILURE_TYPE
    }
}
