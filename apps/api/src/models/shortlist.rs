use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted shortlist entry. `rank` is the 0-based position within its run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShortlistRow {
    pub id: Uuid,
    pub internship_id: String,
    pub rank: i32,
    pub name: String,
    pub email: String,
    #[serde(rename = "appliedDate")]
    pub applied_date: String,
    #[serde(rename = "resumeUrl")]
    pub resume_url: String,
    pub readiness_score: f64,
    pub similarity_score: f64,
    pub skills: Vec<String>,
    pub skill_gaps: Vec<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
