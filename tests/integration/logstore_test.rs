//! Log Store Scenario Tests
//!
//! Scenario loading and querying through the public store and tool APIs.

use std::collections::HashSet;
use std::sync::Arc;

use responder_logstore::{LogStore, Scenario, MAX_HITS};
use responder_tools::{SearchLogsRequest, SearchLogsTool};

fn search(store: &Arc<LogStore>, query: &str) -> responder_tools::SearchLogsResponse {
    SearchLogsTool::new(store.clone()).search(&SearchLogsRequest {
        query: query.to_string(),
        time_window: None,
    })
}

#[test]
fn test_npe_scenario_round_trip() {
    let store = LogStore::new();
    store.load_scenario("payment-500-npe");

    let results = store.query("status_code:500 AND log.level:ERROR");
    assert_eq!(results.total_hits, 50);
    assert_eq!(results.hits.len(), MAX_HITS);

    let ids: HashSet<String> = results.trace_ids().into_iter().collect();
    assert_eq!(ids.len(), MAX_HITS);
    assert!(ids.iter().all(|id| id.starts_with("trace-npe-")));
}

#[test]
fn test_reload_discards_previous_scenario() {
    let store = LogStore::new();
    store.load_scenario("payment-500-npe");
    assert_eq!(store.query("NullPointerException").total_hits, 50);

    store.load_scenario("healthy");
    assert_eq!(store.query("NullPointerException").total_hits, 0);
    assert_eq!(store.query("status_code:500").total_hits, 0);
    assert_eq!(store.query("*:*").total_hits, 2);
}

#[test]
fn test_every_scenario_answers_its_signature_query() {
    let cases = [
        (Scenario::Healthy, "\"processed successfully\"", 1),
        (Scenario::Payment500Npe, "application.name:payment-service AND status_code:500", 50),
        (Scenario::PaymentLatency, "metric:latency AND value:[3000 TO *]", 20),
        (Scenario::InventoryDbTimeout, "\"Connection is not available\" AND db.type:postgres", 15),
        (Scenario::InventoryStockMismatch, "StockCountMismatchException AND log.level:ERROR", 5),
        (Scenario::InventoryCacheInconsistency, "\"Cache key miss\" AND db.status:UP", 20),
        (Scenario::PaymentGatewayTimeout, "status_code:504 AND metric:latency", 15),
    ];

    let store = LogStore::new();
    for (scenario, query, expected) in cases {
        store.load_scenario(scenario.name());
        assert_eq!(
            store.query(query).total_hits,
            expected,
            "{} / {}",
            scenario,
            query
        );
    }
}

#[test]
fn test_unknown_scenario_is_not_fatal() {
    let store = Arc::new(LogStore::with_scenario("payment-500-npe"));
    store.load_scenario("meltdown");

    let response = search(&store, "*:*");
    assert_eq!(response.match_count, 0);
    assert!(response.affected_pods.is_empty());
}

#[test]
fn test_syntax_error_surfaces_as_zero_match_summary() {
    let store = Arc::new(LogStore::with_scenario("payment-gateway-timeout"));

    let response = search(&store, "status_code:(504 OR");
    assert_eq!(response.match_count, 0);
    assert!(response.sample_trace_ids.is_empty());
    assert!(response.summary.starts_with("Query Error: "));
}

#[test]
fn test_deeply_nested_query_surfaces_as_query_error() {
    let store = Arc::new(LogStore::with_scenario("payment-500-npe"));

    let response = search(&store, &"(".repeat(10_000));
    assert_eq!(response.match_count, 0);
    assert!(response.summary.starts_with("Query Error: "));
    assert!(response.summary.contains("nested too deeply"));
}

#[test]
fn test_signed_range_bounds() {
    let store = LogStore::with_scenario("payment-latency");
    assert_eq!(store.query("value:[-5 TO 9000]").total_hits, 20);
    assert_eq!(store.query("value:{-5000 TO 4000}").total_hits, 0);
    assert_eq!(store.query("metric:latency AND value:>-1").total_hits, 20);
}

#[test]
fn test_queries_see_the_latest_load_across_threads() {
    let store = Arc::new(LogStore::with_scenario("payment-500-npe"));

    let writer = {
        let store = store.clone();
        std::thread::spawn(move || {
            for i in 0..20 {
                let name = if i % 2 == 0 { "healthy" } else { "payment-500-npe" };
                store.load_scenario(name);
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let total = store.query("*:*").total_hits;
                    assert!(total == 2 || total == 50, "partial load observed: {}", total);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    // The last write was payment-500-npe.
    assert_eq!(store.query("*:*").total_hits, 50);
}
