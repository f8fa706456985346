use crate::utils::error::{EtlError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Field under which both loaders report the sink-generated identifier, so
/// downstream consumers need not care which lane produced a result.
pub const ID_FIELD: &str = "id";

/// The two load paths a record can be routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Import,
    Create,
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lane::Import => write!(f, "import"),
            Lane::Create => write!(f, "create"),
        }
    }
}

/// One unit of input data: a named-field value bundle. Values arrive as
/// text from the extract file; reads for a specific purpose go through the
/// typed accessors instead of raw casts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub data: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a header row and one data row, pairing values
    /// with field names positionally.
    pub fn from_row(headers: &csv::StringRecord, row: &csv::StringRecord) -> Self {
        let mut data = HashMap::new();
        for (header, value) in headers.iter().zip(row.iter()) {
            data.insert(header.to_string(), Value::String(value.to_string()));
        }
        Self { data }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.data.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.data.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.data.contains_key(field)
    }

    /// Reads a field as text.
    pub fn text(&self, field: &str) -> Result<&str> {
        let value = self.data.get(field).ok_or_else(|| EtlError::MissingField {
            field: field.to_string(),
        })?;
        value.as_str().ok_or_else(|| EtlError::FieldType {
            field: field.to_string(),
        })
    }

    /// Parses a field holding a numeric identifier. Accepts integer and
    /// floating source representations ("42", "42.0"); anything else is a
    /// per-record error.
    pub fn id(&self, field: &str) -> Result<i64> {
        let text = self.text(field)?;
        if let Ok(id) = text.parse::<i64>() {
            return Ok(id);
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(f as i64),
            _ => Err(EtlError::ParseId {
                field: field.to_string(),
                value: text.to_string(),
            }),
        }
    }
}

/// A pure transformation stage, applied to each record in turn.
pub type TransformFn = Box<dyn Fn(Record) -> Record + Send + Sync>;

/// Pure, total lane classifier over record content.
pub type PartitionFn = Box<dyn Fn(&Record) -> Lane + Send + Sync>;

/// Terminal outcome of loading one record. The record enters exactly one
/// loader and leaves as exactly one of these; the output/error exclusivity
/// is carried by the inner `Result`.
#[derive(Debug)]
pub struct LoadResult {
    pub lane: Lane,
    pub input: Record,
    pub outcome: Result<Record>,
}

impl LoadResult {
    pub fn success(lane: Lane, input: Record, output: Record) -> Self {
        Self {
            lane,
            input,
            outcome: Ok(output),
        }
    }

    pub fn failure(lane: Lane, input: Record, error: EtlError) -> Self {
        Self {
            lane,
            input,
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn output(&self) -> Option<&Record> {
        self.outcome.as_ref().ok()
    }
}
