//! Agent Events
//!
//! Structured events emitted by the orchestrator at each state transition.
//! Control flow never depends on how (or whether) these are recorded; a sink
//! decides what to do with them.

use serde::{Deserialize, Serialize};

/// A state transition of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    RunStarted {
        run_id: String,
        service_key: String,
    },
    ContextRetrieved {
        run_id: String,
        documents: usize,
        filtered: bool,
    },
    /// Retrieval produced nothing; the run ends with a fallback.
    NoContext {
        run_id: String,
        service_key: String,
    },
    TurnStarted {
        run_id: String,
        turn: u32,
    },
    ToolApplied {
        run_id: String,
        turn: u32,
        tool: String,
        is_error: bool,
    },
    /// Model text did not yield a verdict; the loop continues.
    ExtractionFailed {
        run_id: String,
        turn: u32,
        reason: String,
    },
    Completed {
        run_id: String,
        turns: u32,
        failure_type: String,
    },
    Exhausted {
        run_id: String,
        turns: u32,
    },
}

impl AgentEvent {
    pub fn run_id(&self) -> &str {
        match self {
            AgentEvent::RunStarted { run_id, .. }
            | AgentEvent::ContextRetrieved { run_id, .. }
            | AgentEvent::NoContext { run_id, .. }
            | AgentEvent::TurnStarted { run_id, .. }
            | AgentEvent::ToolApplied { run_id, .. }
            | AgentEvent::ExtractionFailed { run_id, .. }
            | AgentEvent::Completed { run_id, .. }
            | AgentEvent::Exhausted { run_id, .. } => run_id,
        }
    }

    /// Whether this event ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentEvent::NoContext { .. } | AgentEvent::Completed { .. } | AgentEvent::Exhausted { .. }
        )
    }
}

/// Receiver of orchestrator events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AgentEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: AgentEvent) {}
}
