use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::extract::{FormFields, QueryParams};
use crate::jobs::update::{merge_update, snapshot_details};
use crate::jobs::validation::{parse_job_id, parse_salary_bound, validate_new_job};
use crate::models::job::{
    CreateJobResponse, DeleteJobForm, DeleteJobResponse, ExperienceLevelQuery, IndustryQuery,
    SalaryRangeQuery, UpdateJobForm, UpdateJobResponse,
};
use crate::state::AppState;
use crate::store::{CompanyJobCount, Document, Filter, StoredJob};

const JOB_NOT_FOUND: &str = "Job not found";

fn title_filter(title: Option<&str>) -> Filter {
    Filter::eq("title", title.map_or(Value::Null, Value::from))
}

fn into_documents(jobs: Vec<StoredJob>) -> Vec<Document> {
    jobs.into_iter().map(StoredJob::into_document).collect()
}

/// POST /create/jobPost
pub async fn handle_create_job(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateJobResponse>), AppError> {
    let Json(body) = body.map_err(|e| AppError::Internal(anyhow::anyhow!(e.body_text())))?;
    let doc = validate_new_job(body).inspect_err(|e| warn!("Rejected job post: {e}"))?;

    let id = state
        .store
        .insert_one(doc)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    info!("Created job post {id}");

    Ok((
        StatusCode::CREATED,
        Json(CreateJobResponse {
            message: format!("Job post created successfully with ID: {id}"),
            job_post_id: id.to_string(),
        }),
    ))
}

/// GET /search_by_job_id/:job_id
pub async fn handle_search_by_job_id(
    State(state): State<AppState>,
    job_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Document>, AppError> {
    let Path(job_id) = job_id.map_err(|e| AppError::Validation(e.body_text()))?;
    let job_id = parse_job_id(&job_id)?;

    // Lookup faults are reported as client errors on this route.
    let job = state
        .store
        .find_one(&Filter::eq("id", job_id))
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(JOB_NOT_FOUND.to_string()))?;

    Ok(Json(job.into_document()))
}

/// POST /update_by_job_title
pub async fn handle_update_by_job_title(
    State(state): State<AppState>,
    FormFields(form): FormFields<UpdateJobForm>,
) -> Result<Json<UpdateJobResponse>, AppError> {
    let filter = title_filter(form.job_title.as_deref());

    let job = state
        .store
        .find_one(&filter)
        .await?
        .ok_or_else(|| AppError::NotFound(JOB_NOT_FOUND.to_string()))?;

    let current_job_details = snapshot_details(&job.doc);
    let merged = merge_update(&job.doc, &form)?;
    state.store.replace_one(&filter, merged).await?;
    info!("Updated job {} ({:?})", job.id, form.job_title);

    Ok(Json(UpdateJobResponse {
        message: "Job details updated successfully".to_string(),
        current_job_details,
    }))
}

/// DELETE /delete_by_job_title
///
/// Deletes only when `confirmation` is "yes" (any case); otherwise the job is
/// left in place and the response reports the cancellation.
pub async fn handle_delete_by_job_title(
    State(state): State<AppState>,
    FormFields(form): FormFields<DeleteJobForm>,
) -> Result<Json<DeleteJobResponse>, AppError> {
    let job_title = form.job_title.as_deref();
    let filter = title_filter(job_title);

    let job = state
        .store
        .find_one(&filter)
        .await?
        .ok_or_else(|| AppError::NotFound(JOB_NOT_FOUND.to_string()))?;

    let title = job_title.unwrap_or_default();
    let mut response = DeleteJobResponse {
        message: format!(
            "Are you sure you want to delete the job with title: {title}? \
             Enter Yes to confirm or No to cancel."
        ),
        job_details: job.into_document(),
    };

    let confirmed = form
        .confirmation
        .as_deref()
        .is_some_and(|c| c.eq_ignore_ascii_case("yes"));
    if confirmed {
        state.store.delete_one(&filter).await?;
        info!("Deleted job '{title}'");
        response.message = format!("Job '{title}' deleted successfully");
    } else {
        debug!("Deletion of '{title}' not confirmed");
        response.message = "Deletion canceled".to_string();
    }

    Ok(Json(response))
}

/// GET /jobs_by_salary?min_salary&max_salary
pub async fn handle_jobs_by_salary(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SalaryRangeQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let min = parse_salary_bound("min_salary", params.min_salary.as_deref(), 0.0)?;
    let max = parse_salary_bound("max_salary", params.max_salary.as_deref(), f64::INFINITY)?;
    debug!("Salary range query [{min}, {max}]");

    let jobs = state
        .store
        .find(&Filter::range("average_salary", min, max))
        .await?;
    Ok(Json(into_documents(jobs)))
}

/// GET /jobs_by_experience_level?experience_level
///
/// Without `experience_level` this matches documents whose `Level` is null or
/// absent; it does not return everything.
pub async fn handle_jobs_by_experience_level(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ExperienceLevelQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let level = params.experience_level.map_or(Value::Null, Value::from);
    let jobs = state.store.find(&Filter::eq("Level", level)).await?;
    Ok(Json(into_documents(jobs)))
}

/// GET /top_companies_by_industry?industry
pub async fn handle_top_companies_by_industry(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<IndustryQuery>,
) -> Result<Json<Vec<CompanyJobCount>>, AppError> {
    let industry = params.industry.map_or(Value::Null, Value::from);
    let companies = state
        .store
        .count_by_company(&Filter::eq("industry", industry))
        .await?;
    Ok(Json(companies))
}
