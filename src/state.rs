//! Application State
//!
//! Owns the shared simulation state (log store, health table) and wires it
//! into agents and tools.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use responder_core::RetrievalBackend;
use responder_llm::{LlmProvider, OpenAIProvider};
use responder_logstore::{LogStore, StoreStatus};
use responder_tools::{DiagnosticToolbox, InMemoryHealthTable, ServiceHealthTable};

use crate::models::settings::ResponderConfig;
use crate::services::agent::{IncidentAgent, RetryPolicy};
use crate::services::observability::TracingEventSink;
use crate::services::retriever::ContextRetriever;
use crate::services::runbook::RunbookLibrary;
use crate::utils::error::{AppError, AppResult};

/// Shared state for one responder process.
pub struct AppState {
    config: ResponderConfig,
    log_store: Arc<LogStore>,
    health: Arc<InMemoryHealthTable>,
}

impl AppState {
    /// Build the simulated environment described by `config.simulation`.
    pub fn new(config: ResponderConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::validation)?;

        let log_store = Arc::new(LogStore::with_scenario(&config.simulation.initial_scenario));
        let health = Arc::new(InMemoryHealthTable::seeded());
        for service in &config.simulation.unhealthy_services {
            health.set(service, false);
        }
        info!(
            scenario = %config.simulation.initial_scenario,
            down = ?config.simulation.unhealthy_services,
            "simulation initialized"
        );

        Ok(Self {
            config,
            log_store,
            health,
        })
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    pub fn log_store(&self) -> Arc<LogStore> {
        self.log_store.clone()
    }

    pub fn health_table(&self) -> Arc<InMemoryHealthTable> {
        self.health.clone()
    }

    /// Switch the simulated fault scenario.
    pub fn load_scenario(&self, name: &str) -> StoreStatus {
        self.log_store.load_scenario(name)
    }

    /// Flip a service's health flag.
    pub fn set_service_health(&self, service: &str, healthy: bool) {
        self.health.set(service, healthy);
    }

    pub fn toolbox(&self) -> DiagnosticToolbox {
        DiagnosticToolbox::new(self.health.clone(), self.log_store.clone())
    }

    /// Runbook library from the configured directory, resolved against `base`
    /// when relative.
    pub fn runbook_library(&self, base: &Path) -> AppResult<RunbookLibrary> {
        let dir = Path::new(&self.config.retrieval.runbook_dir);
        let dir = if dir.is_relative() {
            base.join(dir)
        } else {
            dir.to_path_buf()
        };
        RunbookLibrary::from_dir(&dir)
    }

    /// OpenAI-compatible provider from `config.provider`.
    pub fn provider(&self) -> AppResult<Arc<dyn LlmProvider>> {
        Ok(Arc::new(OpenAIProvider::new(self.config.provider_config())?))
    }

    /// An agent over the given collaborators, reporting to `tracing`.
    pub fn agent(
        &self,
        provider: Arc<dyn LlmProvider>,
        backend: Arc<dyn RetrievalBackend>,
    ) -> IncidentAgent {
        let retriever = ContextRetriever::new(backend, self.config.retrieval.filter_policy);
        let retry = RetryPolicy::default().with_max_retries(self.config.agent.max_model_retries);
        IncidentAgent::new(provider, retriever, self.toolbox())
            .with_event_sink(Arc::new(TracingEventSink))
            .with_retry_policy(retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::SettingsUpdate;

    #[test]
    fn test_state_applies_simulation_settings() {
        let mut config = ResponderConfig::default();
        config.apply_update(SettingsUpdate {
            scenario: Some("payment-500-npe".to_string()),
            unhealthy_services: vec!["Payment Service".to_string()],
            ..Default::default()
        });
        let state = AppState::new(config).unwrap();

        assert_eq!(state.log_store().status().records, 50);
        assert!(!state.health_table().get("payment-service"));
        assert!(state.health_table().get("inventory-service"));

        state.set_service_health("payment-service", true);
        assert!(state.health_table().get("payment-service"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ResponderConfig::default();
        config.agent.top_k = 0;
        assert!(matches!(AppState::new(config), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_runbook_library_resolves_relative_dir() {
        let base = tempfile::tempdir().unwrap();
        std::fs::create_dir(base.path().join("runbooks")).unwrap();
        std::fs::write(
            base.path().join("runbooks").join("payment-service.md"),
            "## Alert: Gateway Timeout\n",
        )
        .unwrap();

        let state = AppState::new(ResponderConfig::default()).unwrap();
        let library = state.runbook_library(base.path()).unwrap();
        assert_eq!(library.len(), 1);
    }
}
