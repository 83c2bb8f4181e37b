//! Log Records
//!
//! A record is an ordered set of named fields. Each field declares how it is
//! indexed, mirroring the three kinds a structured log pipeline uses:
//! analyzed text, exact keywords, and stored-only payload.

use serde::{Deserialize, Serialize};

/// Field holding the emitting service.
pub const APPLICATION_NAME: &str = "application.name";
/// Field holding the log level (`INFO`, `ERROR`, ...).
pub const LOG_LEVEL: &str = "log.level";
/// Field holding the record type.
pub const LOG_TYPE: &str = "type";
/// Field holding the HTTP status code.
pub const STATUS_CODE: &str = "status_code";
/// Free-text message field; the default field of unqualified query terms.
pub const MESSAGE: &str = "log.message";
/// Stored-only trace identifier returned with every hit.
pub const TRACE_ID: &str = "trace_id";

/// How a field participates in search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Tokenized and matched case-insensitively
    Text,
    /// Matched as a single exact value
    Keyword,
    /// Returned with hits, never matched
    Stored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub value: String,
}

/// One structured log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    fields: Vec<Field>,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard application log line as emitted by the tracing pipeline.
    pub fn log(
        application: &str,
        level: &str,
        status: &str,
        log_type: &str,
        trace_id: impl Into<String>,
        message: &str,
    ) -> Self {
        Self::new()
            .text(APPLICATION_NAME, application)
            .keyword(LOG_LEVEL, level)
            .keyword(LOG_TYPE, log_type)
            .text(STATUS_CODE, status)
            .text(MESSAGE, message)
            .stored(TRACE_ID, trace_id)
    }

    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Text, value)
    }

    pub fn keyword(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Keyword, value)
    }

    pub fn stored(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Stored, value)
    }

    fn with_field(mut self, name: impl Into<String>, kind: FieldKind, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
            value: value.into(),
        });
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// First value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.get(TRACE_ID)
    }

    pub fn application(&self) -> Option<&str> {
        self.get(APPLICATION_NAME)
    }
}
