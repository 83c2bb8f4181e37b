//! Incident Responder Log Store
//!
//! An embedded, in-memory log search engine used as the evidence source for
//! the log-search diagnostic tool. Records are seeded from named simulation
//! scenarios and queried with a Lucene-style query language.
//!
//! ## Module Organization
//!
//! - `record` - Log record model and field kinds
//! - `analyzer` - Text analysis for text fields
//! - `lexer` / `query` - Query tokenizer, parser, and query tree
//! - `search` - Analyzed index, query evaluation, relevance scoring
//! - `scenario` - Fixed seed sets for fault simulation
//! - `store` - Snapshot-swapping store with atomic reloads
//! - `error` - Query syntax errors

pub mod analyzer;
pub mod error;
pub mod lexer;
pub mod query;
pub mod record;
pub mod scenario;
pub mod search;
pub mod store;

pub use error::{QueryError, QueryResult};
pub use query::{parse, Occur, Query};
pub use record::{FieldKind, LogRecord};
pub use scenario::Scenario;
pub use search::{LogHit, SearchResults, MAX_HITS};
pub use store::{LogStore, StoreStatus};
