//! Settings Models
//!
//! Responder configuration stored in config.toml.

use serde::{Deserialize, Serialize};

use responder_core::{AgentConfig, AgentConfigBuilder, CoreResult};
use responder_llm::ProviderConfig;

/// When the retriever restricts grounding documents to the requested service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterPolicy {
    /// Filter whenever a service name is present, or when the run asks for it
    #[default]
    Mandatory,
    /// Filter only when `strict_metadata_filtering` is set
    Optional,
}

/// Model provider section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// OpenAI-compatible endpoint; `None` uses api.openai.com
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 4096,
            request_timeout_secs: 120,
        }
    }
}

/// Default analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub top_k: usize,
    pub min_score: f32,
    pub temperature: f32,
    pub strict_metadata_filtering: bool,
    /// Extra attempts for a model call that failed with a retryable error
    pub max_model_retries: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        let agent = AgentConfig::default();
        Self {
            top_k: agent.top_k,
            min_score: agent.min_score,
            temperature: agent.temperature,
            strict_metadata_filtering: agent.strict_metadata_filtering,
            max_model_retries: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub filter_policy: FilterPolicy,
    /// Directory of markdown runbooks served by the local library
    pub runbook_dir: String,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            filter_policy: FilterPolicy::default(),
            runbook_dir: "runbooks".to_string(),
        }
    }
}

/// Initial state of the simulated environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub initial_scenario: String,
    /// Services whose health flag starts as DOWN
    pub unhealthy_services: Vec<String>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            initial_scenario: "healthy".to_string(),
            unhealthy_services: Vec::new(),
        }
    }
}

/// Responder configuration stored in config.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    pub provider: ProviderSettings,
    pub agent: AgentSettings,
    pub retrieval: RetrievalSettings,
    pub simulation: SimulationSettings,
}

/// Per-run overrides (partial update), typically from command-line flags
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub top_k: Option<usize>,
    pub min_score: Option<f32>,
    pub temperature: Option<f32>,
    pub strict_metadata_filtering: Option<bool>,
    pub filter_policy: Option<FilterPolicy>,
    pub runbook_dir: Option<String>,
    pub scenario: Option<String>,
    /// Appended to the configured unhealthy services
    pub unhealthy_services: Vec<String>,
}

impl ResponderConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(model) = update.model {
            self.provider.model = model;
        }
        if let Some(base_url) = update.base_url {
            self.provider.base_url = Some(base_url);
        }
        if let Some(top_k) = update.top_k {
            self.agent.top_k = top_k;
        }
        if let Some(min_score) = update.min_score {
            self.agent.min_score = min_score;
        }
        if let Some(temperature) = update.temperature {
            self.agent.temperature = temperature;
        }
        if let Some(strict) = update.strict_metadata_filtering {
            self.agent.strict_metadata_filtering = strict;
        }
        if let Some(policy) = update.filter_policy {
            self.retrieval.filter_policy = policy;
        }
        if let Some(dir) = update.runbook_dir {
            self.retrieval.runbook_dir = dir;
        }
        if let Some(scenario) = update.scenario {
            self.simulation.initial_scenario = scenario;
        }
        self.simulation
            .unhealthy_services
            .extend(update.unhealthy_services);
    }

    /// The per-run agent parameters, range-checked.
    pub fn agent_config(&self) -> CoreResult<AgentConfig> {
        AgentConfigBuilder::new()
            .top_k(self.agent.top_k)
            .min_score(self.agent.min_score)
            .temperature(self.agent.temperature)
            .strict_metadata_filtering(self.agent.strict_metadata_filtering)
            .build()
    }

    /// Provider configuration, with the API key read from the environment.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: std::env::var(&self.provider.api_key_env)
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: self.provider.base_url.clone(),
            model: self.provider.model.clone(),
            max_tokens: self.provider.max_tokens,
            temperature: self.agent.temperature,
            request_timeout_secs: self.provider.request_timeout_secs,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.provider.model.trim().is_empty() {
            return Err("provider.model must not be empty".to_string());
        }

        self.agent_config()
            .map_err(|e| format!("[agent] {}", e))?;

        Ok(())
    }
}
