//! Service Health Probe
//!
//! The health table is the simulated view of infrastructure state: a
//! service-key to up/down map that operators flip to inject faults. The
//! probe reads it and answers with a canned narrative for either state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use responder_core::normalize_service_key;

/// Services registered as healthy in a freshly seeded table.
pub const SEEDED_SERVICES: [&str; 2] = ["payment-service", "inventory-service"];

const DOWN_NARRATIVE: &str = "CRITICAL: Connection Refused. CPU 99%. OOMKilled event detected.";
const UP_NARRATIVE: &str = "Service is healthy. Latency: 45ms. 200 OK.";

/// Shared, mutable service-health state.
///
/// Keys are normalized with [`normalize_service_key`]; services never
/// registered are reported healthy.
pub trait ServiceHealthTable: Send + Sync {
    fn get(&self, service: &str) -> bool;
    fn set(&self, service: &str, healthy: bool);
}

/// In-process health table.
#[derive(Debug, Default)]
pub struct InMemoryHealthTable {
    services: RwLock<HashMap<String, bool>>,
}

impl InMemoryHealthTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the known services registered as UP.
    pub fn seeded() -> Self {
        let table = Self::new();
        for service in SEEDED_SERVICES {
            table.set(service, true);
        }
        table
    }
}

impl ServiceHealthTable for InMemoryHealthTable {
    fn get(&self, service: &str) -> bool {
        let key = normalize_service_key(service);
        let services = match self.services.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        services.get(&key).copied().unwrap_or(true)
    }

    fn set(&self, service: &str, healthy: bool) {
        let key = normalize_service_key(service);
        let mut services = match self.services.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        services.insert(key, healthy);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckRequest {
    #[serde(alias = "service_name", alias = "service")]
    pub service_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: HealthStatus,
    pub logs: String,
}

/// The `healthCheck` tool.
#[derive(Clone)]
pub struct HealthCheckTool {
    table: Arc<dyn ServiceHealthTable>,
}

impl HealthCheckTool {
    pub fn new(table: Arc<dyn ServiceHealthTable>) -> Self {
        Self { table }
    }

    pub fn check(&self, request: &HealthCheckRequest) -> HealthCheckResponse {
        info!(service = %request.service_name, "checking service health");
        if self.table.get(&request.service_name) {
            HealthCheckResponse {
                status: HealthStatus::Up,
                logs: UP_NARRATIVE.to_string(),
            }
        } else {
            HealthCheckResponse {
                status: HealthStatus::Down,
                logs: DOWN_NARRATIVE.to_string(),
            }
        }
    }
}
