use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Document;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub message: String,
    pub job_post_id: String,
}

/// Form body of `POST /update_by_job_title`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJobForm {
    pub job_title: Option<String>,
    pub description: Option<String>,
    pub average_salary: Option<String>,
    pub location: Option<String>,
}

/// The display fields of a posting as they stood before an update.
/// Absent fields are reported as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetailsSnapshot {
    pub title: Value,
    pub description: Value,
    pub average_salary: Value,
    pub location: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateJobResponse {
    pub message: String,
    pub current_job_details: JobDetailsSnapshot,
}

/// Form body of `DELETE /delete_by_job_title`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteJobForm {
    pub job_title: Option<String>,
    pub confirmation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteJobResponse {
    pub message: String,
    pub job_details: Document,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalaryRangeQuery {
    pub min_salary: Option<String>,
    pub max_salary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExperienceLevelQuery {
    pub experience_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndustryQuery {
    pub industry: Option<String>,
}
