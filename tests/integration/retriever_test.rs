//! Context Retriever Integration Tests
//!
//! The retriever over the bundled runbooks and over a backend that ignores
//! metadata filters.

use std::path::Path;
use std::sync::Arc;

use incident_responder::models::settings::FilterPolicy;
use incident_responder::services::{ContextRetriever, RunbookLibrary};
use responder_core::{AgentConfig, IncidentRequest};

use crate::support::{inventory_runbook, payment_runbook, StaticBackend};

fn bundled_library() -> RunbookLibrary {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("runbooks");
    RunbookLibrary::from_dir(&dir).unwrap()
}

#[test]
fn test_bundled_runbooks_are_split_per_alert() {
    let library = bundled_library();
    assert_eq!(library.len(), 6);
}

#[tokio::test]
async fn test_mandatory_policy_scopes_bundled_runbooks() {
    let retriever = ContextRetriever::new(Arc::new(bundled_library()), FilterPolicy::Mandatory);
    let config = AgentConfig {
        top_k: 10,
        ..AgentConfig::default()
    };

    let documents = retriever
        .retrieve(&IncidentRequest::new("Inventory Service", "HikariPool timeouts"), &config)
        .await
        .unwrap();

    assert_eq!(documents.len(), 3);
    assert!(documents
        .iter()
        .all(|d| d.service_name() == Some("inventory-service")));
    assert!(documents[0].text.starts_with("## Alert: Inventory Database Connection Timeout"));
}

#[tokio::test]
async fn test_gateway_alert_is_first_payment_chunk() {
    let retriever = ContextRetriever::new(Arc::new(bundled_library()), FilterPolicy::Mandatory);

    let documents = retriever
        .retrieve(
            &IncidentRequest::new("payment-service", "ERROR: ECONNREFUSED"),
            &AgentConfig::default(),
        )
        .await
        .unwrap();

    assert_eq!(documents.len(), 2);
    assert!(documents[0].text.contains("`status_code:504 AND metric:latency`"));
}

#[tokio::test]
async fn test_unknown_service_yields_nothing() {
    let retriever = ContextRetriever::new(Arc::new(bundled_library()), FilterPolicy::Mandatory);
    let documents = retriever
        .retrieve(&IncidentRequest::new("billing-service", "500s"), &AgentConfig::default())
        .await
        .unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_optional_policy_passes_backend_results_through() {
    let backend = Arc::new(StaticBackend::new(vec![inventory_runbook(), payment_runbook()]));
    let retriever = ContextRetriever::new(backend.clone(), FilterPolicy::Optional);

    let documents = retriever
        .retrieve(&IncidentRequest::new("payment-service", "x"), &AgentConfig::default())
        .await
        .unwrap();

    assert_eq!(documents.len(), 2);
    let query = &backend.queries()[0];
    assert!(query.filter.is_none());
    assert!(query.min_score.is_none());
}

#[tokio::test]
async fn test_local_recheck_under_leaky_backend() {
    let backend = Arc::new(StaticBackend::new(vec![inventory_runbook(), payment_runbook()]));
    let retriever = ContextRetriever::new(backend.clone(), FilterPolicy::Mandatory);
    let config = AgentConfig {
        min_score: 0.7,
        ..AgentConfig::default()
    };

    let documents = retriever
        .retrieve(&IncidentRequest::new("payment-service", "x"), &config)
        .await
        .unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].service_name(), Some("payment-service"));
    assert_eq!(backend.queries()[0].min_score, Some(0.7));
}
