//! Applications and shortlists in PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::models::application::ApplicationRow;
use crate::models::job::JobId;
use crate::models::shortlist::ShortlistRow;
use crate::screening::ranker::Candidate;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn find_application_by_resume_url(
        &self,
        resume_url: &str,
    ) -> Result<Option<ApplicationRow>, StoreError>;

    async fn find_applications(&self, job_id: &str) -> Result<Vec<ApplicationRow>, StoreError>;

    /// Stores one ranked shortlist run. Candidates are expected in rank order.
    async fn insert_shortlist(&self, job_id: &JobId, candidates: &[Candidate]) -> Result<(), StoreError>;

    async fn find_shortlist(&self, job_id: &JobId) -> Result<Vec<ShortlistRow>, StoreError>;
}

#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn find_application_by_resume_url(
        &self,
        resume_url: &str,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE resume_url = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(resume_url)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_applications(&self, job_id: &str) -> Result<Vec<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE job_id = $1 ORDER BY created_at ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_shortlist(&self, job_id: &JobId, candidates: &[Candidate]) -> Result<(), StoreError> {
        // One transaction per run: every row shares the same created_at, which groups runs on read.
        let mut tx = self.pool.begin().await?;

        for (rank, candidate) in candidates.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO shortlisted_candidates
                    (internship_id, rank, name, email, applied_date, resume_url,
                     readiness_score, similarity_score, skills, skill_gaps, text)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(job_id.as_str())
            .bind(rank as i32)
            .bind(&candidate.name)
            .bind(&candidate.email)
            .bind(&candidate.applied_date)
            .bind(&candidate.resume_url)
            .bind(candidate.readiness_score)
            .bind(candidate.similarity_score.unwrap_or(0.0))
            .bind(candidate.skills.to_strings())
            .bind(candidate.skill_gaps.to_strings())
            .bind(&candidate.text)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Stored {} shortlisted candidates for job {job_id}", candidates.len());
        Ok(())
    }

    async fn find_shortlist(&self, job_id: &JobId) -> Result<Vec<ShortlistRow>, StoreError> {
        Ok(sqlx::query_as::<_, ShortlistRow>(
            "SELECT * FROM shortlisted_candidates WHERE internship_id = $1 ORDER BY created_at ASC, rank ASC",
        )
        .bind(job_id.as_str())
        .fetch_all(&self.pool)
        .await?)
    }
}
