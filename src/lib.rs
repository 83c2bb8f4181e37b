//! Incident Responder
//!
//! Runbook-grounded incident diagnosis. This library provides:
//! - The bounded ReAct agent and its collaborators (services)
//! - Configuration models and the TOML config store
//! - Shared simulation state (log store, service health table)
//! - Error types and path utilities

pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::settings::{FilterPolicy, ResponderConfig, SettingsUpdate};
pub use services::{ContextRetriever, IncidentAgent, RetryPolicy, RunbookLibrary};
pub use state::AppState;
pub use storage::ConfigService;
pub use utils::error::{AppError, AppResult};
