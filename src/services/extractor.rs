//! Response Extractor
//!
//! Pulls the terminal verdict out of free-form model text. Models wrap the
//! JSON in prose or markdown fences; the candidate is the span from the first
//! `{` to the last `}`.

use serde::Deserialize;
use serde_json::{Map, Value};

use responder_core::AnalysisResponse;

/// Outcome of an extraction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A schema-valid verdict. Citations are always empty; the orchestrator
    /// sets them.
    Verdict(AnalysisResponse),
    /// The text holds no `{...}` span.
    NotFound,
    /// A span was found but is not a valid verdict.
    Malformed(String),
}

/// Verdict as written by the model. Only the alert name and the hypothesis
/// are mandatory; the rest is filled with empty values.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelVerdict {
    #[serde(alias = "failure_type")]
    failure_type: String,
    #[serde(alias = "root_cause_hypothesis")]
    root_cause_hypothesis: String,
    #[serde(default, alias = "investigation_query")]
    investigation_query: Option<String>,
    #[serde(default)]
    evidence: Value,
    #[serde(default, alias = "responsible_team")]
    responsible_team: Option<String>,
    #[serde(default, alias = "remediation_steps")]
    remediation_steps: Value,
    #[serde(default, alias = "requires_escalation")]
    requires_escalation: Option<bool>,
}

/// Greedy span from the first `{` to the last `}`.
pub fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn extract(output: &str) -> Extraction {
    let Some(span) = json_span(output) else {
        return Extraction::NotFound;
    };

    let verdict: ModelVerdict = match serde_json::from_str(span) {
        Ok(v) => v,
        Err(e) => return Extraction::Malformed(e.to_string()),
    };

    if verdict.failure_type.trim().is_empty() {
        return Extraction::Malformed("failureType is empty".to_string());
    }
    if verdict.root_cause_hypothesis.trim().is_empty() {
        return Extraction::Malformed("rootCauseHypothesis is empty".to_string());
    }

    Extraction::Verdict(AnalysisResponse {
        failure_type: verdict.failure_type,
        root_cause_hypothesis: verdict.root_cause_hypothesis,
        investigation_query: verdict.investigation_query.unwrap_or_default(),
        evidence: evidence_map(verdict.evidence),
        responsible_team: verdict.responsible_team.unwrap_or_default(),
        remediation_steps: steps(verdict.remediation_steps),
        requires_escalation: verdict.requires_escalation.unwrap_or(false),
        citations: Vec::new(),
    })
}

fn evidence_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("summary".to_string(), other);
            map
        }
    }
}

fn steps(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERDICT: &str = r#"{
        "failureType": "Payment Gateway Timeout",
        "rootCauseHypothesis": "Upstream gateway stopped answering",
        "investigationQuery": "status_code:504",
        "evidence": {"searchElfLogs": "15 matches"},
        "responsibleTeam": "Payments-Team",
        "remediationSteps": ["Fail over to the secondary gateway"],
        "requiresEscalation": true
    }"#;

    #[test]
    fn test_extract_with_prose_and_fence() {
        let output = format!(
            "Thought: the alert is the gateway timeout.\n```json\n{}\n```\nDone.",
            VERDICT
        );
        let Extraction::Verdict(response) = extract(&output) else {
            panic!("expected a verdict");
        };
        assert_eq!(response.failure_type, "Payment Gateway Timeout");
        assert_eq!(response.investigation_query, "status_code:504");
        assert_eq!(response.evidence["searchElfLogs"], "15 matches");
        assert!(response.requires_escalation);
        assert!(response.citations.is_empty());
    }

    #[test]
    fn test_span_is_greedy() {
        let text = r#"first {"a": 1} then {"b": 2} end"#;
        assert_eq!(json_span(text), Some(r#"{"a": 1} then {"b": 2}"#));
        assert!(matches!(extract(text), Extraction::Malformed(_)));
    }

    #[test]
    fn test_no_span() {
        assert_eq!(extract("I will call healthCheck next."), Extraction::NotFound);
        assert_eq!(extract("} backwards {"), Extraction::NotFound);
    }

    #[test]
    fn test_missing_required_fields_are_malformed() {
        assert!(matches!(
            extract(r#"{"rootCauseHypothesis": "x"}"#),
            Extraction::Malformed(_)
        ));
        assert!(matches!(
            extract(r#"{"failureType": " ", "rootCauseHypothesis": "x"}"#),
            Extraction::Malformed(ref m) if m.contains("failureType")
        ));
    }

    #[test]
    fn test_minimal_verdict_fills_defaults() {
        let Extraction::Verdict(response) =
            extract(r#"{"failure_type": "Cache Drift", "root_cause_hypothesis": "stale keys", "remediationSteps": "Flush the cache"}"#)
        else {
            panic!("expected a verdict");
        };
        assert_eq!(response.investigation_query, "");
        assert!(response.evidence.is_empty());
        assert_eq!(response.remediation_steps, vec!["Flush the cache"]);
        assert!(!response.requires_escalation);
    }

    #[test]
    fn test_model_citations_are_ignored() {
        let Extraction::Verdict(response) = extract(
            r#"{"failureType": "A", "rootCauseHypothesis": "B", "citations": ["inventory-service"]}"#,
        ) else {
            panic!("expected a verdict");
        };
        assert!(response.citations.is_empty());
    }
}
