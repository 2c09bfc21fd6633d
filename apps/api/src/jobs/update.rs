//! Partial update of a job posting by title.
//!
//! The caller-facing snapshot is taken from the stored document first, then a
//! merged copy is built. The two steps stay separate so the snapshot can never
//! observe merged values.

use serde_json::Value;

use crate::errors::AppError;
use crate::jobs::validation::{coerce_salary, non_empty};
use crate::models::job::{JobDetailsSnapshot, UpdateJobForm};
use crate::store::Document;

fn field_or_empty(doc: &Document, field: &str) -> Value {
    doc.get(field)
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}

/// Display fields of `doc` as currently stored.
pub fn snapshot_details(doc: &Document) -> JobDetailsSnapshot {
    JobDetailsSnapshot {
        title: field_or_empty(doc, "title"),
        description: field_or_empty(doc, "description"),
        average_salary: field_or_empty(doc, "average_salary"),
        location: field_or_empty(doc, "location"),
    }
}

/// Returns a copy of `doc` with every non-empty form field applied.
/// `average_salary` is stored as an integer; a non-integer fails the whole merge.
pub fn merge_update(doc: &Document, form: &UpdateJobForm) -> Result<Document, AppError> {
    let mut merged = doc.clone();

    if let Some(description) = non_empty(form.description.as_deref()) {
        merged.insert("description".to_string(), Value::from(description));
    }
    if let Some(salary) = non_empty(form.average_salary.as_deref()) {
        merged.insert("average_salary".to_string(), Value::from(coerce_salary(salary)?));
    }
    if let Some(location) = non_empty(form.location.as_deref()) {
        merged.insert("location".to_string(), Value::from(location));
    }

    Ok(merged)
}
