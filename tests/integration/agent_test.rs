//! Agent Loop Integration Tests
//!
//! Drives the full retrieve -> reason -> act loop against a scripted model,
//! real diagnostic tools and the embedded log store.

use serde_json::json;

use incident_responder::models::settings::FilterPolicy;
use incident_responder::services::MAX_ITERATIONS;
use incident_responder::AppError;
use responder_core::{AgentConfig, AgentEvent, IncidentRequest, FALLBACK_FAILURE_TYPE};
use responder_llm::{LlmError, MessageContent, MessageRole};
use responder_tools::{ServiceHealthTable, HEALTH_CHECK, SEARCH_LOGS};

use crate::support::*;

fn payment_request() -> IncidentRequest {
    IncidentRequest::new("payment-service", "ERROR: ECONNREFUSED").with_time_window("1h")
}

/// Content of the last tool result in a recorded call.
fn last_tool_output(call: &RecordedCall) -> String {
    call.messages
        .iter()
        .rev()
        .flat_map(|m| m.content.iter())
        .find_map(|block| match block {
            MessageContent::ToolResult { content, .. } => Some(content.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_payment_gateway_timeout_end_to_end() {
    let h = harness(
        vec![payment_runbook()],
        vec![
            tool_call("call_1", HEALTH_CHECK, json!({"serviceName": "payment-service"})),
            tool_call(
                "call_2",
                SEARCH_LOGS,
                json!({"query": "status_code:504 AND metric:latency", "timeWindow": "1h"}),
            ),
            text(&format!(
                "Thought: the alert is \"## Alert: Payment Gateway Timeout\".\n```json\n{}\n```",
                gateway_verdict()
            )),
        ],
        FilterPolicy::Mandatory,
    );
    h.log_store.load_scenario("payment-gateway-timeout");

    let response = h.agent.analyze(&payment_request()).await.unwrap();

    assert!(response.failure_type.contains("Gateway"));
    assert!(response.investigation_query.contains("status_code:504"));
    assert!(response.requires_escalation);
    assert_eq!(response.citations, vec!["payment-service"]);
    assert!(!response.is_fallback());

    let calls = h.provider.calls();
    assert_eq!(calls.len(), 3);
    assert!(last_tool_output(&calls[1]).contains("\"status\":\"UP\""));
    let search_output = last_tool_output(&calls[2]);
    assert!(search_output.contains("\"matchCount\":15"));
    assert!(search_output.contains("gw-timeout-0"));
}

#[tokio::test]
async fn test_every_call_carries_contract_and_context() {
    let h = harness(
        vec![payment_runbook()],
        vec![text(&gateway_verdict())],
        FilterPolicy::Mandatory,
    );
    let config = AgentConfig {
        temperature: 0.3,
        ..AgentConfig::default()
    };

    h.agent.analyze_with(&payment_request(), &config).await.unwrap();

    let call = &h.provider.calls()[0];
    assert_eq!(call.tools, vec!["healthCheck", "searchElfLogs"]);
    assert_eq!(call.temperature, Some(0.3));
    assert!(call.system.as_deref().unwrap().contains("FINAL OUTPUT FORMAT"));

    let opening = call.messages[0].text_content();
    assert_eq!(call.messages[0].role, MessageRole::User);
    assert!(opening.contains("=== RUNBOOK DOCUMENT 1 START (service: payment-service) ==="));
    assert!(opening.contains("=== RUNBOOK DOCUMENT 1 END ==="));
    assert!(opening.contains("USER ISSUE: ERROR: ECONNREFUSED"));
}

#[tokio::test]
async fn test_health_tool_reflects_injected_fault() {
    let h = harness(
        vec![payment_runbook()],
        vec![
            tool_call("call_1", HEALTH_CHECK, json!({"serviceName": "Payment Service"})),
            text(&gateway_verdict()),
        ],
        FilterPolicy::Mandatory,
    );
    h.health.set("payment-service", false);

    h.agent.analyze(&payment_request()).await.unwrap();

    let output = last_tool_output(&h.provider.calls()[1]);
    assert!(output.contains("\"status\":\"DOWN\""));
    assert!(output.contains("CRITICAL"));
}

// ============================================================================
// Fallbacks and the turn budget
// ============================================================================

#[tokio::test]
async fn test_empty_retrieval_skips_the_model() {
    let h = harness(vec![], vec![text(&gateway_verdict())], FilterPolicy::Mandatory);

    let response = h.agent.analyze(&payment_request()).await.unwrap();

    assert_eq!(response.failure_type, FALLBACK_FAILURE_TYPE);
    assert_eq!(
        response.root_cause_hypothesis,
        "No relevant runbooks found for service: payment-service"
    );
    assert!(response.requires_escalation);
    assert!(response.citations.is_empty());
    assert_eq!(response.responsible_team, "SRE-OnCall");
    assert_eq!(h.provider.call_count(), 0);

    let events = h.sink.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[1], AgentEvent::NoContext { .. }));
}

#[tokio::test]
async fn test_tool_calls_alone_exhaust_the_budget() {
    let responses = (0..8)
        .map(|i| tool_call(&format!("call_{i}"), HEALTH_CHECK, json!({"serviceName": "payment-service"})))
        .collect();
    let h = harness(vec![payment_runbook()], responses, FilterPolicy::Mandatory);

    let response = h.agent.analyze(&payment_request()).await.unwrap();

    assert_eq!(h.provider.call_count(), MAX_ITERATIONS as usize);
    assert_eq!(response.failure_type, FALLBACK_FAILURE_TYPE);
    assert_eq!(
        response.root_cause_hypothesis,
        "Agent exceeded max iterations (5) without producing valid JSON."
    );
    assert!(response.requires_escalation);
    assert!(response.citations.is_empty());

    let events = h.sink.events();
    assert!(matches!(events.last(), Some(AgentEvent::Exhausted { turns: 5, .. })));
    assert!(events.iter().all(|e| e.run_id() == events[0].run_id()));
}

#[tokio::test]
async fn test_mixed_malformed_turns_exhaust_the_budget() {
    let h = harness(
        vec![payment_runbook()],
        vec![
            text("I think it is the gateway."),
            tool_call("call_1", SEARCH_LOGS, json!({"query": "status_code:504"})),
            text("{\"failureType\": \"Gateway\""),
            text("{\"rootCauseHypothesis\": \"missing alert name\"}"),
            text(""),
            text(&gateway_verdict()),
        ],
        FilterPolicy::Mandatory,
    );

    let response = h.agent.analyze(&payment_request()).await.unwrap();

    assert_eq!(h.provider.call_count(), 5);
    assert!(response.is_fallback());
    let failures = h
        .sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, AgentEvent::ExtractionFailed { .. }))
        .count();
    assert_eq!(failures, 4);
}

#[tokio::test]
async fn test_malformed_reply_is_corrected_on_next_turn() {
    let h = harness(
        vec![payment_runbook()],
        vec![
            text("```json\n{\"failureType\": \"Payment Gateway Timeout\", }\n```"),
            text(&gateway_verdict()),
        ],
        FilterPolicy::Mandatory,
    );

    let response = h.agent.analyze(&payment_request()).await.unwrap();

    assert_eq!(response.failure_type, "Payment Gateway Timeout");
    let calls = h.provider.calls();
    assert_eq!(calls.len(), 2);
    let correction = calls[1].messages.last().unwrap();
    assert_eq!(correction.role, MessageRole::User);
    assert!(correction.text_content().contains("malformed JSON"));
}

// ============================================================================
// Citations and isolation
// ============================================================================

#[tokio::test]
async fn test_citations_come_from_retrieval_not_the_model() {
    let h = harness(
        vec![payment_runbook(), inventory_runbook()],
        vec![text(&gateway_verdict())],
        FilterPolicy::Optional,
    );

    let response = h.agent.analyze(&payment_request()).await.unwrap();

    assert_eq!(response.citations, vec!["payment-service", "inventory-service"]);
}

#[tokio::test]
async fn test_strict_filtering_isolates_the_requested_service() {
    let h = harness(
        vec![inventory_runbook(), payment_runbook()],
        vec![text(&gateway_verdict())],
        FilterPolicy::Optional,
    );
    let config = AgentConfig {
        strict_metadata_filtering: true,
        ..AgentConfig::default()
    };

    let response = h
        .agent
        .analyze_with(&IncidentRequest::new("Payment Service", "ERROR: ECONNREFUSED"), &config)
        .await
        .unwrap();

    assert!(response.citations.iter().all(|c| c == "payment-service"));
    assert_eq!(response.citations.len(), 1);

    let query = &h.backend.queries()[0];
    assert_eq!(
        query.filter.as_ref().unwrap().expression(),
        "service_name == 'payment-service'"
    );
    let opening = h.provider.calls()[0].messages[0].text_content();
    assert!(!opening.contains("Inventory Database"));
}

#[tokio::test]
async fn test_strict_filtering_with_no_match_falls_back() {
    let h = harness(
        vec![inventory_runbook()],
        vec![text(&gateway_verdict())],
        FilterPolicy::Mandatory,
    );

    let response = h.agent.analyze(&payment_request()).await.unwrap();

    assert!(response.is_fallback());
    assert_eq!(h.provider.call_count(), 0);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_backend_failure_propagates() {
    let h = harness(vec![], vec![], FilterPolicy::Mandatory);
    let agent = incident_responder::IncidentAgent::new(
        h.provider.clone(),
        incident_responder::ContextRetriever::new(
            std::sync::Arc::new(UnreachableBackend),
            FilterPolicy::Mandatory,
        ),
        responder_tools::DiagnosticToolbox::new(h.health.clone(), h.log_store.clone()),
    );

    let err = agent.analyze(&payment_request()).await.unwrap_err();
    assert!(matches!(err, AppError::Retrieval(ref m) if m.contains("unreachable")));
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn test_retryable_errors_do_not_consume_turns() {
    let h = harness(
        vec![payment_runbook()],
        vec![
            Err(LlmError::NetworkError {
                message: "connection reset".to_string(),
            }),
            Err(LlmError::RateLimited {
                message: "slow down".to_string(),
                retry_after: None,
            }),
            text(&gateway_verdict()),
        ],
        FilterPolicy::Mandatory,
    );

    let response = h.agent.analyze(&payment_request()).await.unwrap();

    assert_eq!(response.failure_type, "Payment Gateway Timeout");
    assert_eq!(h.provider.call_count(), 3);
    let turns = h
        .sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, AgentEvent::TurnStarted { .. }))
        .count();
    assert_eq!(turns, 1);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let network = || {
        Err(LlmError::NetworkError {
            message: "down".to_string(),
        })
    };
    let h = harness(
        vec![payment_runbook()],
        vec![network(), network(), network(), text(&gateway_verdict())],
        FilterPolicy::Mandatory,
    );

    let err = h.agent.analyze(&payment_request()).await.unwrap_err();
    assert!(matches!(err, AppError::Llm(LlmError::NetworkError { .. })));
    assert_eq!(h.provider.call_count(), 3);
}

#[tokio::test]
async fn test_non_retryable_error_propagates_immediately() {
    let h = harness(
        vec![payment_runbook()],
        vec![Err(LlmError::AuthenticationFailed {
            message: "bad key".to_string(),
        })],
        FilterPolicy::Mandatory,
    );

    let err = h.agent.analyze(&payment_request()).await.unwrap_err();
    assert!(matches!(err, AppError::Llm(LlmError::AuthenticationFailed { .. })));
    assert_eq!(h.provider.call_count(), 1);
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_retrieval() {
    let h = harness(vec![payment_runbook()], vec![], FilterPolicy::Mandatory);
    let config = AgentConfig {
        top_k: 0,
        ..AgentConfig::default()
    };

    let err = h.agent.analyze_with(&payment_request(), &config).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(h.backend.queries().is_empty());
}
