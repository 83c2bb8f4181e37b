//! Test doubles shared by the integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use incident_responder::models::settings::FilterPolicy;
use incident_responder::services::{ContextRetriever, IncidentAgent, RetryPolicy};
use responder_core::{
    AgentEvent, CoreError, CoreResult, EventSink, RetrievalBackend, RetrievedDocument,
    SimilarityQuery,
};
use responder_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
    ToolCall, ToolDefinition,
};
use responder_logstore::LogStore;
use responder_tools::{DiagnosticToolbox, InMemoryHealthTable};

/// A model call as the provider received it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub tools: Vec<String>,
    pub temperature: Option<f32>,
}

/// Provider that returns predefined responses in order and records every call.
pub struct ScriptedProvider {
    responses: Mutex<Vec<LlmResult<LlmResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
    config: ProviderConfig,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<LlmResult<LlmResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
            config: ProviderConfig::default(),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages,
            system,
            tools: tools.into_iter().map(|t| t.name).collect(),
            temperature: request_options.temperature_override,
        });
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(LlmError::Other {
                message: "No more scripted responses available".to_string(),
            })
        } else {
            responses.remove(0)
        }
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Backend returning a fixed corpus, ignoring any filter.
pub struct StaticBackend {
    documents: Vec<RetrievedDocument>,
    queries: Mutex<Vec<SimilarityQuery>>,
}

impl StaticBackend {
    pub fn new(documents: Vec<RetrievedDocument>) -> Self {
        Self {
            documents,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<SimilarityQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RetrievalBackend for StaticBackend {
    fn name(&self) -> &str {
        "static"
    }

    async fn similarity_search(&self, query: &SimilarityQuery) -> CoreResult<Vec<RetrievedDocument>> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.documents.iter().take(query.top_k).cloned().collect())
    }
}

/// Backend that always fails.
pub struct UnreachableBackend;

#[async_trait]
impl RetrievalBackend for UnreachableBackend {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn similarity_search(&self, _: &SimilarityQuery) -> CoreResult<Vec<RetrievedDocument>> {
        Err(CoreError::backend("vector store unreachable"))
    }
}

/// Sink that keeps every event.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<AgentEvent>>,
}

impl CollectingSink {
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: AgentEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn text(content: &str) -> LlmResult<LlmResponse> {
    Ok(LlmResponse::text(content, "scripted-model"))
}

pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> LlmResult<LlmResponse> {
    Ok(LlmResponse::tool_use(
        vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }],
        "scripted-model",
    ))
}

/// A well-formed verdict for the gateway timeout alert.
pub fn gateway_verdict() -> String {
    json!({
        "failureType": "Payment Gateway Timeout",
        "rootCauseHypothesis": "The upstream payment gateway is not answering; 504s while the service is UP.",
        "investigationQuery": "status_code:504 AND metric:latency",
        "evidence": {
            "healthCheck": "UP",
            "searchElfLogs": "15 matches"
        },
        "responsibleTeam": "Payments-Team",
        "remediationSteps": [
            "Switch traffic to the secondary payment gateway.",
            "Open a ticket with the gateway provider including sample trace ids."
        ],
        "requiresEscalation": true,
        "citations": ["made-up-service"]
    })
    .to_string()
}

pub fn payment_runbook() -> RetrievedDocument {
    RetrievedDocument::for_service(
        "## Alert: Payment Gateway Timeout\n**Investigation query:** `status_code:504 AND metric:latency`",
        "payment-service",
    )
}

pub fn inventory_runbook() -> RetrievedDocument {
    RetrievedDocument::for_service(
        "## Alert: Inventory Database Connection Timeout\n**Investigation query:** `\"Connection is not available\"`",
        "inventory-service",
    )
}

/// Everything a test needs to drive and inspect one agent.
pub struct Harness {
    pub agent: IncidentAgent,
    pub provider: Arc<ScriptedProvider>,
    pub backend: Arc<StaticBackend>,
    pub sink: Arc<CollectingSink>,
    pub log_store: Arc<LogStore>,
    pub health: Arc<InMemoryHealthTable>,
}

pub fn harness(
    documents: Vec<RetrievedDocument>,
    responses: Vec<LlmResult<LlmResponse>>,
    policy: FilterPolicy,
) -> Harness {
    let provider = Arc::new(ScriptedProvider::new(responses));
    let backend = Arc::new(StaticBackend::new(documents));
    let sink = Arc::new(CollectingSink::default());
    let log_store = Arc::new(LogStore::with_scenario("healthy"));
    let health = Arc::new(InMemoryHealthTable::seeded());

    let agent = IncidentAgent::new(
        provider.clone(),
        ContextRetriever::new(backend.clone(), policy),
        DiagnosticToolbox::new(health.clone(), log_store.clone()),
    )
    .with_event_sink(sink.clone())
    .with_retry_policy(RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    });

    Harness {
        agent,
        provider,
        backend,
        sink,
        log_store,
        health,
    }
}
