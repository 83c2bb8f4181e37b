//! Simulation Scenarios
//!
//! Each scenario is a fixed, deterministic record set reproducing one fault
//! condition, so that an analysis can be run against known log evidence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::{LogRecord, APPLICATION_NAME, MESSAGE, STATUS_CODE, TRACE_ID};

const OPENTRACING: &str = "opentracing-log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    Healthy,
    #[serde(rename = "payment-500-npe")]
    Payment500Npe,
    PaymentLatency,
    InventoryDbTimeout,
    InventoryStockMismatch,
    InventoryCacheInconsistency,
    PaymentGatewayTimeout,
}

impl Scenario {
    pub const ALL: [Scenario; 7] = [
        Scenario::Healthy,
        Scenario::Payment500Npe,
        Scenario::PaymentLatency,
        Scenario::InventoryDbTimeout,
        Scenario::InventoryStockMismatch,
        Scenario::InventoryCacheInconsistency,
        Scenario::PaymentGatewayTimeout,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Healthy => "healthy",
            Scenario::Payment500Npe => "payment-500-npe",
            Scenario::PaymentLatency => "payment-latency",
            Scenario::InventoryDbTimeout => "inventory-db-timeout",
            Scenario::InventoryStockMismatch => "inventory-stock-mismatch",
            Scenario::InventoryCacheInconsistency => "inventory-cache-inconsistency",
            Scenario::PaymentGatewayTimeout => "payment-gateway-timeout",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Healthy => "baseline traffic, no faults",
            Scenario::Payment500Npe => "payment-service 500s from a NullPointerException",
            Scenario::PaymentLatency => "payment-service latency at 5000ms",
            Scenario::InventoryDbTimeout => "inventory-service cannot obtain database connections",
            Scenario::InventoryStockMismatch => "inventory-service stock count mismatches",
            Scenario::InventoryCacheInconsistency => "inventory-service cache misses with a healthy database",
            Scenario::PaymentGatewayTimeout => "payment-service 504s awaiting the upstream gateway",
        }
    }

    /// Case-insensitive lookup by identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(wanted))
    }

    /// The seed records of this scenario.
    pub fn records(&self) -> Vec<LogRecord> {
        match self {
            Scenario::Healthy => vec![
                LogRecord::log(
                    "payment-service",
                    "INFO",
                    "200",
                    OPENTRACING,
                    "tx-ok-1",
                    "Payment processed successfully",
                ),
                LogRecord::log(
                    "inventory-service",
                    "INFO",
                    "200",
                    OPENTRACING,
                    "tx-ok-2",
                    "Stock updated",
                ),
            ],
            Scenario::Payment500Npe => (0..50)
                .map(|i| {
                    LogRecord::log(
                        "payment-service",
                        "ERROR",
                        "500",
                        OPENTRACING,
                        format!("trace-npe-{i}"),
                        "java.lang.NullPointerException at com.example.payment.Processor.process(Processor.java:42)",
                    )
                })
                .collect(),
            Scenario::PaymentLatency => (0..20)
                .map(|i| {
                    LogRecord::new()
                        .text(APPLICATION_NAME, "payment-service")
                        .keyword("metric", "latency")
                        .keyword("value", "5000")
                        .stored(TRACE_ID, format!("slow-tx-{i}"))
                })
                .collect(),
            Scenario::InventoryDbTimeout => (0..15)
                .map(|i| {
                    LogRecord::new()
                        .text(APPLICATION_NAME, "inventory-service")
                        .keyword("db.type", "postgres")
                        .text(
                            MESSAGE,
                            "Connection check failed. HikariPool-1 - Connection is not available",
                        )
                        .stored(TRACE_ID, format!("db-err-{i}"))
                })
                .collect(),
            Scenario::InventoryStockMismatch => (0..5)
                .map(|i| {
                    LogRecord::log(
                        "inventory-service",
                        "ERROR",
                        "500",
                        OPENTRACING,
                        format!("stock-err-{i}"),
                        "CRITICAL: StockCountMismatchException: SKU-123 expected 5 but found 3",
                    )
                })
                .collect(),
            Scenario::InventoryCacheInconsistency => (0..20)
                .map(|i| {
                    LogRecord::new()
                        .text(APPLICATION_NAME, "inventory-service")
                        .text(MESSAGE, "WARN: Cache key miss for SKU-999. Fetching from DB.")
                        .keyword("db.status", "UP")
                        .stored(TRACE_ID, format!("cache-miss-{i}"))
                })
                .collect(),
            Scenario::PaymentGatewayTimeout => (0..15)
                .map(|i| {
                    LogRecord::new()
                        .text(APPLICATION_NAME, "payment-service")
                        .text(STATUS_CODE, "504")
                        .keyword("metric", "latency")
                        .keyword("value", "6500")
                        .text(MESSAGE, "Gateway Timeout awaiting upstream response")
                        .stored(TRACE_ID, format!("gw-timeout-{i}"))
                })
                .collect(),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown scenario '{}'", s))
    }
}
