use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::job::JobId;
use crate::models::shortlist::ShortlistRow;
use crate::screening::pipeline::{parse_job_skills_json, SkillAnalysis};
use crate::screening::ranker::{Candidate, JobPosting};
use crate::state::AppState;

/// `job_skills` arrives either as a JSON array or as a JSON-encoded string of one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum JobSkillsField {
    List(Vec<String>),
    Encoded(String),
}

impl JobSkillsField {
    fn into_skills(self) -> Vec<String> {
        match self {
            JobSkillsField::List(skills) => skills,
            JobSkillsField::Encoded(raw) => parse_job_skills_json(&raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShortlistRequest {
    pub internship_id: String,
    #[serde(default)]
    pub job_description: String,
    pub job_skills: Option<JobSkillsField>,
    #[serde(default)]
    pub resumes: Vec<String>,
}

#[derive(Serialize)]
pub struct ShortlistEntry {
    pub internship_id: String,
    #[serde(flatten)]
    pub candidate: Candidate,
}

#[derive(Serialize)]
pub struct ShortlistResponse {
    pub shortlisted_candidates: Vec<ShortlistEntry>,
}

#[derive(Serialize)]
pub struct StoredShortlistResponse {
    pub shortlisted_candidates: Vec<ShortlistRow>,
}

#[derive(Serialize)]
pub struct ApplicationsResponse {
    pub applications: Vec<ApplicationRow>,
}

#[derive(Default)]
struct AnalyzeForm {
    file: Option<(String, Bytes)>,
    job_description: String,
    required_skills: String,
}

/// Body-limit overflows surface as 413; anything else is a malformed request.
fn multipart_error(e: MultipartError, what: &str, max_upload_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the {max_upload_bytes} byte limit"))
    } else {
        AppError::Validation(format!("{what}: {e}"))
    }
}

async fn read_analyze_form(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Malformed multipart body", max_upload_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "Failed to read upload", max_upload_bytes))?;
                form.file = Some((filename, data));
            }
            "job_description" | "required_skills" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| {
                        multipart_error(e, &format!("Failed to read '{name}'"), max_upload_bytes)
                    })?;
                if name == "job_description" {
                    form.job_description = value;
                } else {
                    form.required_skills = value;
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// POST /analyze-skills
pub async fn handle_analyze_skills(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SkillAnalysis>, AppError> {
    let form = read_analyze_form(multipart, state.max_upload_bytes).await?;
    let (filename, data) = form
        .file
        .ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    info!(%filename, bytes = data.len(), "Analysing uploaded resume");
    let analysis = state
        .screener
        .analyze(&filename, data, &form.job_description, &form.required_skills)
        .await?;
    Ok(Json(analysis))
}

/// POST /partner/shortlist
pub async fn handle_shortlist(
    State(state): State<AppState>,
    Json(req): Json<ShortlistRequest>,
) -> Result<Json<ShortlistResponse>, AppError> {
    let job_id: JobId = req.internship_id.parse()?;
    let job = JobPosting {
        description: req.job_description,
        skills: req.job_skills.map(JobSkillsField::into_skills).unwrap_or_default(),
    };

    let ranked = state.screener.shortlist(&job_id, &job, &req.resumes).await;
    let shortlisted_candidates = ranked
        .into_iter()
        .map(|candidate| ShortlistEntry {
            internship_id: job_id.to_string(),
            candidate,
        })
        .collect();

    Ok(Json(ShortlistResponse {
        shortlisted_candidates,
    }))
}

/// GET /partner/shortlisted/:internship_id
pub async fn handle_get_shortlisted(
    State(state): State<AppState>,
    Path(internship_id): Path<String>,
) -> Result<Json<StoredShortlistResponse>, AppError> {
    let job_id: JobId = internship_id.parse()?;
    let shortlisted_candidates = state.store.find_shortlist(&job_id).await?;
    Ok(Json(StoredShortlistResponse {
        shortlisted_candidates,
    }))
}

/// GET /partner/fetch-applications/:job_id
pub async fn handle_fetch_applications(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<ApplicationsResponse>, AppError> {
    let applications = state.store.find_applications(&job_id).await?;
    Ok(Json(ApplicationsResponse { applications }))
}
