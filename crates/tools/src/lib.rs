//! Incident Responder Tools
//!
//! Read-only diagnostic tools the orchestrator exposes to the model:
//! - `health` - service health table and the `healthCheck` probe
//! - `log_search` - the `searchElfLogs` probe over the embedded log store
//! - `diagnostic` - the closed `DiagnosticCall` set and the `DiagnosticToolbox`
//! - `executor` - `ToolResult`, the uniform tool output
//!
//! Tools are synchronous; each call completes before the orchestrator resumes.

pub mod diagnostic;
pub mod error;
pub mod executor;
pub mod health;
pub mod log_search;

pub use diagnostic::{DiagnosticCall, DiagnosticToolbox, HEALTH_CHECK, SEARCH_LOGS};
pub use error::ToolError;
pub use executor::ToolResult;
pub use health::{
    HealthCheckRequest, HealthCheckResponse, HealthCheckTool, HealthStatus, InMemoryHealthTable,
    ServiceHealthTable,
};
pub use log_search::{SearchLogsRequest, SearchLogsResponse, SearchLogsTool};
