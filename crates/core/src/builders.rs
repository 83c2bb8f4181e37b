//! Agent Configuration Builder
//!
//! Provides a validated builder for [`AgentConfig`].
//!
//! The builder follows the standard Rust builder pattern:
//! 1. Create with `::new()` or `::default()`
//! 2. Chain `.field(value)` calls
//! 3. Call `.build()` which validates and returns `CoreResult<AgentConfig>`
//!
//! Validation happens at build time, catching out-of-range retrieval or
//! sampling parameters before a run starts.

use crate::error::{CoreError, CoreResult};
use crate::incident::AgentConfig;

/// Upper bound on documents requested per retrieval.
pub const MAX_TOP_K: usize = 100;

impl AgentConfig {
    /// Check that every field is within its allowed range.
    pub fn validate(&self) -> CoreResult<()> {
        if self.top_k == 0 {
            return Err(CoreError::validation("top_k must be > 0"));
        }
        if self.top_k > MAX_TOP_K {
            return Err(CoreError::validation(format!(
                "top_k must be <= {}",
                MAX_TOP_K
            )));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(CoreError::validation(
                "min_score must be between 0.0 and 1.0",
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(CoreError::validation(
                "temperature must be between 0.0 and 1.0",
            ));
        }
        Ok(())
    }
}

/// Builder for agent configuration with validation at build time.
///
/// # Example
/// ```ignore
/// let config = AgentConfigBuilder::new()
///     .top_k(4)
///     .strict_metadata_filtering(true)
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct AgentConfigBuilder {
    top_k: Option<usize>,
    min_score: Option<f32>,
    temperature: Option<f32>,
    strict_metadata_filtering: Option<bool>,
}

impl AgentConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of documents to retrieve (1..=100).
    pub fn top_k(mut self, n: usize) -> Self {
        self.top_k = Some(n);
        self
    }

    /// Set the similarity floor (0.0..=1.0).
    pub fn min_score(mut self, score: f32) -> Self {
        self.min_score = Some(score);
        self
    }

    /// Set the sampling temperature (0.0..=1.0).
    pub fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Restrict retrieval to the requested service.
    pub fn strict_metadata_filtering(mut self, enabled: bool) -> Self {
        self.strict_metadata_filtering = Some(enabled);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> CoreResult<AgentConfig> {
        let defaults = AgentConfig::default();
        let config = AgentConfig {
            top_k: self.top_k.unwrap_or(defaults.top_k),
            min_score: self.min_score.unwrap_or(defaults.min_score),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            strict_metadata_filtering: self
                .strict_metadata_filtering
                .unwrap_or(defaults.strict_metadata_filtering),
        };
        config.validate()?;
        Ok(config)
    }
}
