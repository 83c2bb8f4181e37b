//! Indexed Log Store
//!
//! Holds the current record set as an immutable snapshot behind an
//! `RwLock<Arc<_>>`. Loading a scenario builds a complete new snapshot off
//! to the side and swaps it in under the write lock; queries clone the `Arc`
//! and evaluate without holding any lock. A query therefore observes either
//! the previous record set or the new one in full, never a mix.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::query::parse;
use crate::record::LogRecord;
use crate::scenario::Scenario;
use crate::search::{SearchIndex, SearchResults, MAX_HITS};

struct Snapshot {
    generation: u64,
    scenario: Option<Scenario>,
    index: SearchIndex,
}

/// Summary of the committed record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStatus {
    /// Number of completed loads since the store was created
    pub generation: u64,
    pub scenario: Option<Scenario>,
    pub records: usize,
}

pub struct LogStore {
    current: RwLock<Arc<Snapshot>>,
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot {
                generation: 0,
                scenario: None,
                index: SearchIndex::default(),
            })),
        }
    }

    /// A store seeded with the given scenario.
    pub fn with_scenario(name: &str) -> Self {
        let store = Self::new();
        store.load_scenario(name);
        store
    }

    /// Replace every record with the seed set of `name` (case-insensitive).
    ///
    /// An unknown name empties the store.
    pub fn load_scenario(&self, name: &str) -> StoreStatus {
        let scenario = Scenario::from_name(name);
        match scenario {
            Some(s) => info!(scenario = %s, "switching log store scenario"),
            None => warn!(scenario = %name, "unknown scenario, leaving log store empty"),
        }
        let records = scenario.map(|s| s.records()).unwrap_or_default();
        self.commit(scenario, records)
    }

    /// Replace every record with an arbitrary record set.
    pub fn replace_records(&self, records: Vec<LogRecord>) -> StoreStatus {
        self.commit(None, records)
    }

    fn commit(&self, scenario: Option<Scenario>, records: Vec<LogRecord>) -> StoreStatus {
        let index = SearchIndex::build(records);

        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let snapshot = Arc::new(Snapshot {
            generation: guard.generation + 1,
            scenario,
            index,
        });
        let status = status_of(&snapshot);
        *guard = snapshot;
        drop(guard);

        debug!(generation = status.generation, records = status.records, "log store snapshot committed");
        status
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn status(&self) -> StoreStatus {
        status_of(&self.snapshot())
    }

    /// Run a query against the latest committed records.
    ///
    /// Syntax errors yield an empty result carrying the diagnostic.
    pub fn query(&self, query: &str) -> SearchResults {
        let parsed = match parse(query) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(query = %query, error = %e, "log query rejected");
                return SearchResults::failed(e);
            }
        };
        let snapshot = self.snapshot();
        let results = snapshot.index.search(&parsed, MAX_HITS);
        debug!(
            query = %query,
            generation = snapshot.generation,
            total_hits = results.total_hits,
            "log query evaluated"
        );
        results
    }
}

fn status_of(snapshot: &Snapshot) -> StoreStatus {
    StoreStatus {
        generation: snapshot.generation,
        scenario: snapshot.scenario,
        records: snapshot.index.len(),
    }
}
