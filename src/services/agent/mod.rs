//! Incident Agent
//!
//! Bounded ReAct loop: retrieve grounding runbooks, then alternate model
//! turns and diagnostic tool calls until the model emits a verdict or the
//! turn budget runs out.
//!
//! ```text
//! RETRIEVE -> BUILD_CONTEXT -> AWAIT_MODEL -+-> tool calls  -> APPLY_TOOL -> AWAIT_MODEL
//!                                           +-> text        -> EXTRACT -+-> verdict -> DONE
//!                                                                       +-> invalid -> AWAIT_MODEL
//!                              (turn budget spent)                                  -> EXHAUSTED
//! ```
//!
//! State transitions are reported to an [`EventSink`]; the loop itself does
//! not log them.

pub mod prompt;
pub mod transcript;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use responder_core::{
    AgentConfig, AgentEvent, AnalysisResponse, EventSink, IncidentRequest, NoopEventSink,
    RetrievedDocument,
};
use responder_llm::{LlmError, LlmProvider, LlmRequestOptions, LlmResponse, ToolDefinition};
use responder_tools::DiagnosticToolbox;

use crate::services::extractor::{self, Extraction};
use crate::services::retriever::ContextRetriever;
use crate::utils::error::AppResult;

pub use transcript::Transcript;

/// Maximum model turns per analysis.
pub const MAX_ITERATIONS: u32 = 5;

/// Citation recorded for documents without service attribution.
const UNKNOWN_SERVICE: &str = "unknown";

/// Retry behavior for model calls that fail with a retryable error.
/// Retries never consume turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// First delay; doubles per attempt
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Wait before retry number `attempt` (0-based). A provider-supplied
    /// `retry_after` wins over the exponential schedule.
    pub fn delay(&self, attempt: u32, err: &LlmError) -> Duration {
        let wait = match err {
            LlmError::RateLimited {
                retry_after: Some(secs),
                ..
            } => Duration::from_secs(u64::from(*secs)),
            _ => self.base_delay.saturating_mul(1u32 << attempt.min(16)),
        };
        wait.min(self.max_delay)
    }
}

/// Distinct `service_name` values of the retrieved documents, in retrieval order.
pub fn citations(documents: &[RetrievedDocument]) -> Vec<String> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .map(|doc| doc.service_name().unwrap_or(UNKNOWN_SERVICE).to_string())
        .filter(|service| seen.insert(service.clone()))
        .collect()
}

/// The incident diagnosis orchestrator.
///
/// Collaborators are fixed at construction. Each call to [`analyze_with`]
/// owns its transcript; concurrent analyses share only the log store and the
/// health table behind the toolbox.
///
/// [`analyze_with`]: IncidentAgent::analyze_with
pub struct IncidentAgent {
    provider: Arc<dyn LlmProvider>,
    retriever: ContextRetriever,
    toolbox: DiagnosticToolbox,
    events: Arc<dyn EventSink>,
    retry: RetryPolicy,
}

impl IncidentAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        retriever: ContextRetriever,
        toolbox: DiagnosticToolbox,
    ) -> Self {
        Self {
            provider,
            retriever,
            toolbox,
            events: Arc::new(NoopEventSink),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Analyze with the default [`AgentConfig`].
    pub async fn analyze(&self, request: &IncidentRequest) -> AppResult<AnalysisResponse> {
        self.analyze_with(request, &AgentConfig::default()).await
    }

    /// Analyze an incident.
    ///
    /// Empty retrieval and turn exhaustion yield fallback verdicts. Backend
    /// failures and non-retryable model failures are returned as errors.
    pub async fn analyze_with(
        &self,
        request: &IncidentRequest,
        config: &AgentConfig,
    ) -> AppResult<AnalysisResponse> {
        config.validate()?;

        let run_id = Uuid::new_v4().to_string();
        let service_key = request.service_key();
        self.events.emit(AgentEvent::RunStarted {
            run_id: run_id.clone(),
            service_key: service_key.clone(),
        });

        // RETRIEVE
        let documents = self.retriever.retrieve(request, config).await?;
        if documents.is_empty() {
            self.events.emit(AgentEvent::NoContext {
                run_id,
                service_key,
            });
            return Ok(AnalysisResponse::fallback(format!(
                "No relevant runbooks found for service: {}",
                request.service_name
            )));
        }
        self.events.emit(AgentEvent::ContextRetrieved {
            run_id: run_id.clone(),
            documents: documents.len(),
            filtered: self.retriever.requires_filter(request, config),
        });

        // BUILD_CONTEXT
        let citations = citations(&documents);
        let system = prompt::system_prompt();
        let tools = self.toolbox.definitions();
        let options = LlmRequestOptions::with_temperature(config.temperature);
        let mut transcript = Transcript::open(prompt::incident_message(request, &documents));

        for turn in 1..=MAX_ITERATIONS {
            self.events.emit(AgentEvent::TurnStarted {
                run_id: run_id.clone(),
                turn,
            });

            let response = self.send(&transcript, &system, &tools, &options).await?;
            let text = response.text_content();
            transcript = transcript.with_assistant_turn(text, &response.tool_calls);

            let reason = match text.map(extractor::extract) {
                Some(Extraction::Verdict(verdict)) => {
                    let verdict = verdict.with_citations(citations);
                    self.events.emit(AgentEvent::Completed {
                        run_id,
                        turns: turn,
                        failure_type: verdict.failure_type.clone(),
                    });
                    return Ok(verdict);
                }
                Some(Extraction::Malformed(e)) => format!("malformed JSON: {}", e),
                Some(Extraction::NotFound) => "no JSON object found".to_string(),
                None => "empty reply".to_string(),
            };

            if response.has_tool_calls() {
                let results = response
                    .tool_calls
                    .iter()
                    .map(|call| {
                        let result = self.toolbox.invoke(call);
                        self.events.emit(AgentEvent::ToolApplied {
                            run_id: run_id.clone(),
                            turn,
                            tool: call.name.clone(),
                            is_error: !result.success,
                        });
                        (call.id.clone(), result)
                    })
                    .collect();
                transcript = transcript.with_tool_results(results);
                continue;
            }

            self.events.emit(AgentEvent::ExtractionFailed {
                run_id: run_id.clone(),
                turn,
                reason: reason.clone(),
            });
            transcript = transcript.with_user_message(prompt::correction(&reason));
        }

        self.events.emit(AgentEvent::Exhausted {
            run_id,
            turns: MAX_ITERATIONS,
        });
        Ok(AnalysisResponse::fallback(format!(
            "Agent exceeded max iterations ({}) without producing valid JSON.",
            MAX_ITERATIONS
        )))
    }

    /// One model turn, retrying retryable failures.
    async fn send(
        &self,
        transcript: &Transcript,
        system: &str,
        tools: &[ToolDefinition],
        options: &LlmRequestOptions,
    ) -> AppResult<LlmResponse> {
        let mut attempt = 0;
        loop {
            let result = self
                .provider
                .send_message(
                    transcript.messages().to_vec(),
                    Some(system.to_string()),
                    tools.to_vec(),
                    options.clone(),
                )
                .await;

            match result {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let wait = self.retry.delay(attempt, &err);
                    warn!(
                        provider = self.provider.name(),
                        attempt = attempt + 1,
                        max_retries = self.retry.max_retries,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "retryable model error, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
