use serde_json::Value;

use crate::errors::AppError;
use crate::store::{Document, ID_KEY};

const REQUIRED_FIELDS_MESSAGE: &str = "Title and industry are required fields.";

/// Whether a JSON value counts as "supplied": null, false, zero, and empty
/// strings, arrays and objects do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Checks a create-job body and returns the document to insert.
///
/// The body must be an object with truthy `title` and `industry`. Every other
/// field passes through untouched, except `_id`, which the store assigns.
pub fn validate_new_job(body: Value) -> Result<Document, AppError> {
    let Value::Object(mut doc) = body else {
        return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    };

    let has = |field: &str| doc.get(field).is_some_and(is_truthy);
    if !has("title") || !has("industry") {
        return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    }

    doc.remove(ID_KEY);
    Ok(doc)
}

/// Parses the path segment of `/search_by_job_id/<job_id>`.
pub fn parse_job_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| AppError::Validation(format!("invalid job id '{raw}': {e}")))
}

/// Parses an optional salary bound, falling back to `default` when absent.
/// Accepts anything `f64` parses, including `inf`.
pub fn parse_salary_bound(name: &str, raw: Option<&str>, default: f64) -> Result<f64, AppError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|e| AppError::Fault(format!("invalid {name} '{raw}': {e}"))),
    }
}

/// Coerces an updated salary to an integer.
pub fn coerce_salary(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| AppError::Fault(format!("invalid average_salary '{raw}': {e}")))
}

/// `Some` only for a supplied, non-empty form value.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(5), json!("x"), json!([0]), json!({ "a": 1 })] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn test_validate_new_job_passes_extra_fields_through() {
        let doc = validate_new_job(json!({
            "title": "Engineer",
            "industry": "Tech",
            "remote": true,
            "tags": ["rust"],
        }))
        .unwrap();
        assert_eq!(doc["remote"], json!(true));
        assert_eq!(doc["tags"], json!(["rust"]));
    }

    #[test]
    fn test_validate_new_job_drops_caller_id() {
        let doc = validate_new_job(json!({
            "_id": "mine",
            "title": "Engineer",
            "industry": "Tech",
        }))
        .unwrap();
        assert!(!doc.contains_key(ID_KEY));
    }

    #[test]
    fn test_validate_new_job_requires_title_and_industry() {
        let bodies = [
            json!({ "industry": "Tech" }),
            json!({ "title": "Engineer" }),
            json!({ "title": "", "industry": "Tech" }),
            json!({ "title": "Engineer", "industry": null }),
            json!(["title", "industry"]),
        ];
        for body in bodies {
            match validate_new_job(body.clone()) {
                Err(AppError::Validation(msg)) => assert_eq!(msg, REQUIRED_FIELDS_MESSAGE),
                other => panic!("{body} should fail validation, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_job_id() {
        assert_eq!(parse_job_id("42").unwrap(), 42);
        assert_eq!(parse_job_id("-3").unwrap(), -3);
        assert!(matches!(parse_job_id("abc"), Err(AppError::Validation(_))));
        assert!(matches!(parse_job_id("4.5"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_salary_bound() {
        assert_eq!(parse_salary_bound("min_salary", None, 0.0).unwrap(), 0.0);
        assert_eq!(
            parse_salary_bound("max_salary", None, f64::INFINITY).unwrap(),
            f64::INFINITY
        );
        assert_eq!(
            parse_salary_bound("min_salary", Some("5000.5"), 0.0).unwrap(),
            5000.5
        );
        assert_eq!(
            parse_salary_bound("max_salary", Some("inf"), 0.0).unwrap(),
            f64::INFINITY
        );
        assert!(matches!(
            parse_salary_bound("min_salary", Some("lots"), 0.0),
            Err(AppError::Fault(_))
        ));
    }

    #[test]
    fn test_coerce_salary_requires_integer() {
        assert_eq!(coerce_salary(" 85000 ").unwrap(), 85_000);
        assert!(matches!(coerce_salary("85k"), Err(AppError::Fault(_))));
        assert!(matches!(coerce_salary("85000.5"), Err(AppError::Fault(_))));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("x")), Some("x"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
    }
}
