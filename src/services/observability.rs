//! Tracing Event Sink
//!
//! Forwards orchestrator events to `tracing`.

use tracing::{debug, info, warn};

use responder_core::{AgentEvent, EventSink};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: AgentEvent) {
        match &event {
            AgentEvent::RunStarted { run_id, service_key } => {
                info!(run_id = %run_id, service = %service_key, "analysis started")
            }
            AgentEvent::ContextRetrieved {
                run_id,
                documents,
                filtered,
            } => info!(run_id = %run_id, documents, filtered, "context retrieved"),
            AgentEvent::NoContext { run_id, service_key } => {
                warn!(run_id = %run_id, service = %service_key, "no runbooks found")
            }
            AgentEvent::TurnStarted { run_id, turn } => {
                debug!(run_id = %run_id, turn, "turn started")
            }
            AgentEvent::ToolApplied {
                run_id,
                turn,
                tool,
                is_error,
            } => debug!(run_id = %run_id, turn, tool = %tool, is_error, "tool applied"),
            AgentEvent::ExtractionFailed {
                run_id,
                turn,
                reason,
            } => warn!(run_id = %run_id, turn, reason = %reason, "no verdict in model output"),
            AgentEvent::Completed {
                run_id,
                turns,
                failure_type,
            } => info!(run_id = %run_id, turns, failure_type = %failure_type, "analysis completed"),
            AgentEvent::Exhausted { run_id, turns } => {
                warn!(run_id = %run_id, turns, "turn budget exhausted")
            }
        }
    }
}
