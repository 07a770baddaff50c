//! Structured JSONL test log.
//!
//! Tests record one entry per verified scenario. Every entry must carry the
//! fields below so logs from different crates can be aggregated:
//!
//! | field            | type                              |
//! |------------------|-----------------------------------|
//! | `timestamp`      | RFC 3339 string                   |
//! | `test_name`      | non-empty string                  |
//! | `module`         | non-empty string                  |
//! | `phase`          | `setup`, `execute` or `verify`    |
//! | `correlation_id` | non-empty string                  |
//! | `result`         | `pass`, `fail` or `skip`          |
//! | `duration_ms`    | unsigned integer                  |
//! | `assertions`     | `{ "passed": u64, "failed": u64 }` |

use chrono::DateTime;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use thiserror::Error;

const PHASES: [&str; 3] = ["setup", "execute", "verify"];
const RESULTS: [&str; 3] = ["pass", "fail", "skip"];

/// Invalid test log content.
#[derive(Debug, Error)]
pub enum LogCaptureError {
    #[error("line {line}: not valid JSON: {message}")]
    InvalidJson { line: usize, message: String },

    #[error("line {line}: entry is not a JSON object")]
    NotAnObject { line: usize },

    #[error("line {line}: missing field `{field}`")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: invalid `{field}`: {message}")]
    InvalidField {
        line: usize,
        field: &'static str,
        message: String,
    },

    #[error("failed to serialize entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// In-memory JSONL log for a test.
#[derive(Debug, Default)]
pub struct LogCapture {
    lines: Mutex<Vec<String>>,
}

impl LogCapture {
    /// Create an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a structured entry.
    pub fn push_value(&self, entry: &Value) -> Result<(), LogCaptureError> {
        let line = serde_json::to_string(entry)?;
        self.lines.lock().push(line);
        Ok(())
    }

    /// Append a raw JSONL line.
    pub fn push_line(&self, line: impl Into<String>) {
        self.lines.lock().push(line.into());
    }

    /// Raw lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Parsed entries; lines that are not valid JSON are skipped.
    #[must_use]
    pub fn entries(&self) -> Vec<Value> {
        self.lines
            .lock()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// The whole log as JSONL text.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = self.lines.lock().join("\n");
        out.push('\n');
        out
    }

    /// Validate every line; returns the number of entries.
    pub fn validate_jsonl(&self) -> Result<usize, LogCaptureError> {
        let lines = self.lines.lock();
        for (idx, line) in lines.iter().enumerate() {
            validate_line(idx + 1, line)?;
        }
        Ok(lines.len())
    }

    /// Assert that the log is valid.
    ///
    /// # Panics
    ///
    /// Panics with the first validation error.
    pub fn assert_valid(&self) {
        if let Err(err) = self.validate_jsonl() {
            panic!("structured test log is invalid: {err}\n{}", self.to_jsonl());
        }
    }
}

fn validate_line(line: usize, raw: &str) -> Result<(), LogCaptureError> {
    let value: Value = serde_json::from_str(raw).map_err(|err| LogCaptureError::InvalidJson {
        line,
        message: err.to_string(),
    })?;
    let entry = value
        .as_object()
        .ok_or(LogCaptureError::NotAnObject { line })?;

    let timestamp = text_field(entry, line, "timestamp")?;
    DateTime::parse_from_rfc3339(timestamp)
        .map_err(|err| invalid(line, "timestamp", err.to_string()))?;

    text_field(entry, line, "test_name")?;
    text_field(entry, line, "module")?;
    text_field(entry, line, "correlation_id")?;

    let phase = text_field(entry, line, "phase")?;
    if !PHASES.contains(&phase) {
        return Err(invalid(line, "phase", format!("unknown phase {phase}")));
    }
    let result = text_field(entry, line, "result")?;
    if !RESULTS.contains(&result) {
        return Err(invalid(line, "result", format!("unknown result {result}")));
    }

    field(entry, line, "duration_ms")?
        .as_u64()
        .ok_or_else(|| invalid(line, "duration_ms", "expected an unsigned integer".into()))?;

    let assertions = field(entry, line, "assertions")?;
    for counter in ["passed", "failed"] {
        assertions
            .get(counter)
            .and_then(Value::as_u64)
            .ok_or_else(|| invalid(line, "assertions", format!("missing `{counter}` count")))?;
    }

    Ok(())
}

fn field<'a>(
    entry: &'a Map<String, Value>,
    line: usize,
    name: &'static str,
) -> Result<&'a Value, LogCaptureError> {
    entry
        .get(name)
        .ok_or(LogCaptureError::MissingField { line, field: name })
}

fn text_field<'a>(
    entry: &'a Map<String, Value>,
    line: usize,
    name: &'static str,
) -> Result<&'a str, LogCaptureError> {
    field(entry, line, name)?
        .as_str()
        .filter(|text| !text.is_empty())
        .ok_or_else(|| invalid(line, name, "expected a non-empty string".into()))
}

fn invalid(line: usize, field: &'static str, message: String) -> LogCaptureError {
    LogCaptureError::InvalidField {
        line,
        field,
        message,
    }
}
