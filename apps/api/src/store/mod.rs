//! Document store port for job postings.
//!
//! Handlers only see `JobStore`; `AppState` carries an `Arc<dyn JobStore>`
//! chosen at startup from `STORE_BACKEND`.
//!
//! - `PgJobStore`: JSONB documents in PostgreSQL (default).
//! - `MemoryJobStore`: process-local, used by tests and throwaway runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryJobStore;
pub use postgres::PgJobStore;

/// Schema-less job posting payload: field name to JSON value.
pub type Document = Map<String, Value>;

/// Key under which the store-assigned identifier is surfaced to clients.
pub const ID_KEY: &str = "_id";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt document: {0}")]
    Corrupt(String),
}

/// A persisted document together with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredJob {
    pub id: Uuid,
    pub doc: Document,
}

impl StoredJob {
    /// Renders the document for the wire with `_id` as a string.
    pub fn into_document(self) -> Document {
        let mut doc = self.doc;
        doc.insert(ID_KEY.to_string(), Value::String(self.id.to_string()));
        doc
    }
}

/// One row of the per-company aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyJobCount {
    pub company_name: Value,
    pub job_count: i64,
}

/// Query predicate over a single top-level field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals `value`. A `Null` value also matches documents lacking the field.
    Eq { field: String, value: Value },
    /// Numeric field within `[min, max]` inclusive. Non-numeric values never match.
    Range { field: String, min: f64, max: f64 },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn range(field: impl Into<String>, min: f64, max: f64) -> Self {
        Filter::Range {
            field: field.into(),
            min,
            max,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq { field, value } => {
                let actual = doc.get(field).unwrap_or(&Value::Null);
                values_equal(actual, value)
            }
            Filter::Range { field, min, max } => doc
                .get(field)
                .and_then(Value::as_f64)
                .is_some_and(|n| *min <= n && n <= *max),
        }
    }
}

/// JSON equality where numbers compare by value, so `5` equals `5.0`
/// but `9007199254740993` does not equal `9007199254740992`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_key(x) == number_key(y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Exact numeric identity. Integers never pass through `f64`; integral floats
/// fold into the integer they represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NumberKey {
    Int(i128),
    Float(u64),
}

fn number_key(n: &Number) -> NumberKey {
    if let Some(i) = n.as_i64() {
        return NumberKey::Int(i.into());
    }
    if let Some(u) = n.as_u64() {
        return NumberKey::Int(u.into());
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    // Both i128 bounds are exact powers of two in f64.
    if f.fract() == 0.0 && f >= i128::MIN as f64 && f < i128::MAX as f64 {
        NumberKey::Int(f as i128)
    } else {
        NumberKey::Float(f.to_bits())
    }
}

/// Grouping key under which values that `values_equal` treats as equal
/// collide, e.g. `5` and `5.0`.
pub(crate) fn group_key(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{:?}", number_key(n)),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(group_key).collect();
            format!("[{}]", parts.join(","))
        }
        Value::Object(fields) => {
            let mut parts: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), group_key(v)))
                .collect();
            parts.sort();
            format!("{{{}}}", parts.join(","))
        }
        other => other.to_string(),
    }
}

/// The job document store. Implement this to swap persistence backends
/// without touching the handlers.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Stores `doc` as a new document and returns its assigned identifier.
    async fn insert_one(&self, doc: Document) -> Result<Uuid, StoreError>;

    /// First matching document in insertion order.
    async fn find_one(&self, filter: &Filter) -> Result<Option<StoredJob>, StoreError>;

    /// All matching documents in insertion order.
    async fn find(&self, filter: &Filter) -> Result<Vec<StoredJob>, StoreError>;

    /// Replaces the body of the first matching document. Returns whether one matched.
    async fn replace_one(&self, filter: &Filter, doc: Document) -> Result<bool, StoreError>;

    /// Deletes the first matching document. Returns whether one matched.
    async fn delete_one(&self, filter: &Filter) -> Result<bool, StoreError>;

    /// Counts matching documents per `company_name`, highest count first.
    async fn count_by_company(&self, filter: &Filter) -> Result<Vec<CompanyJobCount>, StoreError>;

    async fn close(&self) {}
}
