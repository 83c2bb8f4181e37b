//! Diagnostic Toolbox
//!
//! The closed set of tools the orchestrator exposes to the model. Tool calls
//! are parsed into a [`DiagnosticCall`] once, then applied by matching on
//! the variant; there is no string-keyed registry.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::warn;

use responder_llm::{ParameterSchema, ToolCall, ToolDefinition};
use responder_logstore::LogStore;

use crate::error::ToolError;
use crate::executor::ToolResult;
use crate::health::{HealthCheckRequest, HealthCheckTool, ServiceHealthTable};
use crate::log_search::{SearchLogsRequest, SearchLogsTool};

/// Stable identifier of the health probe.
pub const HEALTH_CHECK: &str = "healthCheck";
/// Stable identifier of the log search probe.
pub const SEARCH_LOGS: &str = "searchElfLogs";

/// A parsed, typed tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticCall {
    HealthCheck(HealthCheckRequest),
    SearchLogs(SearchLogsRequest),
}

impl DiagnosticCall {
    pub fn from_tool_call(call: &ToolCall) -> Result<Self, ToolError> {
        match call.name.as_str() {
            HEALTH_CHECK => decode(HEALTH_CHECK, &call.arguments).map(DiagnosticCall::HealthCheck),
            SEARCH_LOGS => decode(SEARCH_LOGS, &call.arguments).map(DiagnosticCall::SearchLogs),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            DiagnosticCall::HealthCheck(_) => HEALTH_CHECK,
            DiagnosticCall::SearchLogs(_) => SEARCH_LOGS,
        }
    }
}

fn decode<T: DeserializeOwned>(tool: &str, arguments: &serde_json::Value) -> Result<T, ToolError> {
    // Some models send the argument object as a JSON string.
    let value = match arguments {
        serde_json::Value::String(raw) => serde_json::from_str(raw)
            .map_err(|e| ToolError::invalid_arguments(tool, e.to_string()))?,
        other => other.clone(),
    };
    serde_json::from_value(value).map_err(|e| ToolError::invalid_arguments(tool, e.to_string()))
}

/// Both diagnostic tools, wired to their collaborators at construction time.
#[derive(Clone)]
pub struct DiagnosticToolbox {
    health: HealthCheckTool,
    logs: SearchLogsTool,
}

impl DiagnosticToolbox {
    pub fn new(health_table: Arc<dyn ServiceHealthTable>, log_store: Arc<LogStore>) -> Self {
        Self {
            health: HealthCheckTool::new(health_table),
            logs: SearchLogsTool::new(log_store),
        }
    }

    /// Schemas registered with the model on every turn.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut health_props = HashMap::new();
        health_props.insert(
            "serviceName".to_string(),
            ParameterSchema::string(Some("Name of the service to probe, e.g. payment-service")),
        );

        let mut search_props = HashMap::new();
        search_props.insert(
            "query".to_string(),
            ParameterSchema::string(Some(
                "Lucene-style query, e.g. status_code:[500 TO 599] AND log.level:ERROR",
            )),
        );
        search_props.insert(
            "timeWindow".to_string(),
            ParameterSchema::string(Some("Look-back window such as 15m or 1h"))
                .with_default(json!("1h")),
        );

        vec![
            ToolDefinition {
                name: HEALTH_CHECK.to_string(),
                description: "Check the real-time health status of a service. Returns UP or DOWN with recent system logs.".to_string(),
                input_schema: ParameterSchema::object(None, health_props, vec!["serviceName".to_string()]),
            },
            ToolDefinition {
                name: SEARCH_LOGS.to_string(),
                description: "Search the structured application logs. Returns the match count, sample trace ids, affected pods, and a summary.".to_string(),
                input_schema: ParameterSchema::object(None, search_props, vec!["query".to_string()]),
            },
        ]
    }

    /// Apply a parsed call.
    pub fn apply(&self, call: &DiagnosticCall) -> ToolResult {
        match call {
            DiagnosticCall::HealthCheck(request) => ToolResult::ok_json(&self.health.check(request)),
            DiagnosticCall::SearchLogs(request) => ToolResult::ok_json(&self.logs.search(request)),
        }
    }

    /// Parse and apply a model tool call. Bad calls become error results the
    /// model can read and correct.
    pub fn invoke(&self, call: &ToolCall) -> ToolResult {
        match DiagnosticCall::from_tool_call(call) {
            Ok(parsed) => self.apply(&parsed),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "rejected tool call");
                ToolResult::err(e.to_string())
            }
        }
    }
}
