//! Services
//!
//! Business logic of the responder: retrieval, verdict extraction, runbook
//! ingestion, and the agent loop.

pub mod agent;
pub mod extractor;
pub mod observability;
pub mod retriever;
pub mod runbook;

pub use agent::{IncidentAgent, RetryPolicy, MAX_ITERATIONS};
pub use extractor::{extract, Extraction};
pub use observability::TracingEventSink;
pub use retriever::ContextRetriever;
pub use runbook::{load_runbooks, split_runbook, RunbookLibrary};
