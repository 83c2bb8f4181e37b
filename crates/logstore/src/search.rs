//! Search Index & Query Evaluation
//!
//! An immutable, pre-analyzed view of a record set. Queries are evaluated
//! against every record; hits are ranked by a summed inverse-document-frequency
//! score so that rare terms outrank common ones. Wildcard and range clauses
//! contribute a constant score. Ties keep insertion order.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::analyzer::{analyze, analyze_phrase, normalize_term, Position};
use crate::error::QueryError;
use crate::lexer::Glob;
use crate::query::{Occur, Query};
use crate::record::{FieldKind, LogRecord};

/// Maximum number of hits returned per query.
pub const MAX_HITS: usize = 10;

enum IndexedValue {
    Text(Vec<Position>),
    Keyword(String),
}

struct IndexedRecord {
    record: LogRecord,
    fields: HashMap<String, Vec<IndexedValue>>,
}

impl IndexedRecord {
    fn new(record: LogRecord) -> Self {
        let mut fields: HashMap<String, Vec<IndexedValue>> = HashMap::new();
        for field in record.fields() {
            let value = match field.kind {
                FieldKind::Text => IndexedValue::Text(analyze(&field.value)),
                FieldKind::Keyword => IndexedValue::Keyword(field.value.clone()),
                FieldKind::Stored => continue,
            };
            fields.entry(field.name.clone()).or_default().push(value);
        }
        Self { record, fields }
    }

    fn any_value(&self, field: &str, predicate: impl Fn(&IndexedValue) -> bool) -> bool {
        self.fields
            .get(field)
            .is_some_and(|values| values.iter().any(predicate))
    }
}

/// A single ranked match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogHit {
    pub trace_id: Option<String>,
    pub application: Option<String>,
    pub score: f32,
}

/// Outcome of one query: the total match count and the top-ranked hits.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub total_hits: usize,
    pub hits: Vec<LogHit>,
    /// Set when the query could not be parsed; the result is then empty
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_error")]
    pub error: Option<QueryError>,
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<QueryError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_str(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl SearchResults {
    pub fn failed(error: QueryError) -> Self {
        Self {
            total_hits: 0,
            hits: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Trace ids of the returned hits, in rank order.
    pub fn trace_ids(&self) -> Vec<String> {
        self.hits
            .iter()
            .filter_map(|hit| hit.trace_id.clone())
            .collect()
    }
}

/// Immutable analyzed record set.
#[derive(Default)]
pub struct SearchIndex {
    records: Vec<IndexedRecord>,
}

impl SearchIndex {
    pub fn build(records: Vec<LogRecord>) -> Self {
        Self {
            records: records.into_iter().map(IndexedRecord::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Evaluate `query`, returning at most `limit` hits ordered by score.
    pub fn search(&self, query: &Query, limit: usize) -> SearchResults {
        let scores = self.score_all(query);

        let mut matched: Vec<(usize, f32)> = scores
            .into_iter()
            .enumerate()
            .filter_map(|(idx, score)| score.map(|s| (idx, s)))
            .collect();
        let total_hits = matched.len();

        // Stable sort: equal scores keep insertion order.
        matched.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        matched.truncate(limit);

        let hits = matched
            .into_iter()
            .map(|(idx, score)| {
                let record = &self.records[idx].record;
                LogHit {
                    trace_id: record.trace_id().map(str::to_string),
                    application: record.application().map(str::to_string),
                    score,
                }
            })
            .collect();

        SearchResults {
            total_hits,
            hits,
            error: None,
        }
    }

    /// Per-record score, `None` where the record does not match.
    fn score_all(&self, query: &Query) -> Vec<Option<f32>> {
        match query {
            Query::MatchAll => vec![Some(1.0); self.len()],
            Query::Term { field, term } => {
                self.idf_scored(|doc| doc.any_value(field, |v| term_matches(v, term)))
            }
            Query::Phrase { field, text } => {
                self.idf_scored(|doc| doc.any_value(field, |v| phrase_matches(v, text)))
            }
            Query::Wildcard { field, pattern } => {
                self.constant_scored(|doc| doc.any_value(field, |v| wildcard_matches(v, pattern)))
            }
            Query::Range {
                field,
                lower,
                upper,
                include_lower,
                include_upper,
            } => {
                let bounds = RangeBounds {
                    lower: lower.as_deref(),
                    upper: upper.as_deref(),
                    include_lower: *include_lower,
                    include_upper: *include_upper,
                };
                self.constant_scored(|doc| doc.any_value(field, |v| bounds.matches_value(v)))
            }
            Query::Boost { query, boost } => self
                .score_all(query)
                .into_iter()
                .map(|s| s.map(|s| s * boost))
                .collect(),
            Query::Boolean(clauses) => self.score_boolean(clauses),
        }
    }

    fn score_boolean(&self, clauses: &[crate::query::Clause]) -> Vec<Option<f32>> {
        let scored: Vec<(Occur, Vec<Option<f32>>)> = clauses
            .iter()
            .map(|c| (c.occur, self.score_all(&c.query)))
            .collect();

        let has_must = scored.iter().any(|(o, _)| *o == Occur::Must);
        let has_should = scored.iter().any(|(o, _)| *o == Occur::Should);

        (0..self.len())
            .map(|doc| {
                let mut score = 0.0;
                let mut matched_should = false;
                for (occur, scores) in &scored {
                    match (occur, scores[doc]) {
                        (Occur::MustNot, Some(_)) => return None,
                        (Occur::MustNot, None) => {}
                        (Occur::Must, Some(s)) => score += s,
                        (Occur::Must, None) => return None,
                        (Occur::Should, Some(s)) => {
                            score += s;
                            matched_should = true;
                        }
                        (Occur::Should, None) => {}
                    }
                }
                if has_must || matched_should {
                    Some(score)
                } else if !has_should {
                    // Purely negative: everything not excluded matches.
                    Some(1.0)
                } else {
                    None
                }
            })
            .collect()
    }

    fn idf_scored(&self, matches: impl Fn(&IndexedRecord) -> bool) -> Vec<Option<f32>> {
        let hits: Vec<bool> = self.records.iter().map(matches).collect();
        let df = hits.iter().filter(|m| **m).count();
        let idf = 1.0 + ((self.len() as f32 + 1.0) / (df as f32 + 1.0)).ln();
        hits.into_iter().map(|m| m.then_some(idf)).collect()
    }

    fn constant_scored(&self, matches: impl Fn(&IndexedRecord) -> bool) -> Vec<Option<f32>> {
        self.records
            .iter()
            .map(|doc| matches(doc).then_some(1.0))
            .collect()
    }
}

fn term_matches(value: &IndexedValue, term: &str) -> bool {
    match value {
        IndexedValue::Text(positions) => match normalize_term(term) {
            Some(t) => positions.iter().any(|forms| forms.contains(&t)),
            None => false,
        },
        IndexedValue::Keyword(v) => v == term,
    }
}

fn phrase_matches(value: &IndexedValue, text: &str) -> bool {
    match value {
        IndexedValue::Text(positions) => {
            let terms = analyze_phrase(text);
            if terms.is_empty() || terms.len() > positions.len() {
                return false;
            }
            positions.windows(terms.len()).any(|window| {
                window
                    .iter()
                    .zip(&terms)
                    .all(|(forms, term)| forms.contains(term))
            })
        }
        IndexedValue::Keyword(v) => v == text,
    }
}

fn wildcard_matches(value: &IndexedValue, pattern: &[Glob]) -> bool {
    match value {
        IndexedValue::Text(positions) => {
            let lowered: Vec<Glob> = pattern
                .iter()
                .map(|g| match g {
                    Glob::Literal(c) => Glob::Literal(c.to_lowercase().next().unwrap_or(*c)),
                    other => other.clone(),
                })
                .collect();
            positions
                .iter()
                .flatten()
                .any(|form| glob_match(&lowered, form))
        }
        IndexedValue::Keyword(v) => glob_match(pattern, v),
    }
}

/// Iterative wildcard match with single-star backtracking.
fn glob_match(pattern: &[Glob], text: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(Glob::AnyMany) => {
                star = Some((p, t));
                p += 1;
            }
            Some(Glob::AnyOne) => {
                p += 1;
                t += 1;
            }
            Some(Glob::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|g| *g == Glob::AnyMany)
}

struct RangeBounds<'a> {
    lower: Option<&'a str>,
    upper: Option<&'a str>,
    include_lower: bool,
    include_upper: bool,
}

impl RangeBounds<'_> {
    fn matches_value(&self, value: &IndexedValue) -> bool {
        match value {
            IndexedValue::Text(positions) => positions
                .iter()
                .filter_map(|forms| forms.first())
                .any(|token| self.contains(token, true)),
            IndexedValue::Keyword(v) => self.contains(v, false),
        }
    }

    fn contains(&self, value: &str, lowercase_bounds: bool) -> bool {
        let bound = |b: &str| {
            if lowercase_bounds {
                b.to_lowercase()
            } else {
                b.to_string()
            }
        };
        let above_lower = match self.lower {
            None => true,
            Some(lower) => match compare(value, &bound(lower)) {
                Ordering::Greater => true,
                Ordering::Equal => self.include_lower,
                Ordering::Less => false,
            },
        };
        let below_upper = match self.upper {
            None => true,
            Some(upper) => match compare(value, &bound(upper)) {
                Ordering::Less => true,
                Ordering::Equal => self.include_upper,
                Ordering::Greater => false,
            },
        };
        above_lower && below_upper
    }
}

/// Numeric comparison when both sides are numbers, lexicographic otherwise.
fn compare(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}
