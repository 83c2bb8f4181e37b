//! Incident Responder Core
//!
//! Foundational data model, error types, and contracts for the Incident
//! Responder workspace. This crate has zero dependencies on application-level
//! code (model providers, log store, configuration files, etc.).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `incident` - Request, per-run configuration, and verdict types
//! - `builders` - Validated builder for `AgentConfig`
//! - `retrieval` - Retrieval backend contract (`RetrievalBackend`, `RetrievedDocument`)
//! - `events` - Orchestrator event stream (`AgentEvent`, `EventSink`)
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/async-trait/thiserror** - keeps build times minimal
//! 2. **Trait-based abstractions** - enables mocking the backend and the event sink in tests
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod incident;
pub mod builders;
pub mod retrieval;
pub mod events;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Data Model ─────────────────────────────────────────────────────────
pub use incident::{
    normalize_service_key, AgentConfig, AnalysisResponse, IncidentRequest, DEFAULT_TIME_WINDOW,
    FALLBACK_FAILURE_TYPE, ON_CALL_TEAM,
};

// ── Builder Pattern ────────────────────────────────────────────────────
pub use builders::{AgentConfigBuilder, MAX_TOP_K};

// ── Retrieval Contract ─────────────────────────────────────────────────
pub use retrieval::{
    MetadataFilter, RetrievalBackend, RetrievedDocument, SimilarityQuery, SERVICE_NAME_KEY,
};

// ── Events ─────────────────────────────────────────────────────────────
pub use events::{AgentEvent, EventSink, NoopEventSink};
