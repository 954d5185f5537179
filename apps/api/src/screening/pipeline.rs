//! Screening pipelines: single-resume skill analysis and batch shortlisting.
//!
//! `Screener` owns every collaborator as an injected trait object. Per-resume units in a
//! batch are independent and run with bounded concurrency; ranking waits for all of them.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::documents::{DocumentFormat, TextExtractor};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::application::Identity;
use crate::models::job::JobId;
use crate::screening::extractor::{extract_skills, Vocabulary};
use crate::screening::gap::{gaps_and_score, score_sets};
use crate::screening::learning::{generate_quizzes, recommend_courses, CourseRecommendations, Quizzes};
use crate::screening::normalizer::{Skill, SkillSet};
use crate::screening::ranker::{rank, Candidate, JobPosting};
use crate::screening::similarity::similarity;
use crate::storage::{BlobStore, CandidateStore};

#[derive(Debug, Clone)]
pub struct ScreeningSettings {
    /// Minimum readiness (exclusive) for a shortlist.
    pub admission_threshold: f64,
    /// Maximum resumes processed at once in a batch.
    pub concurrency: usize,
}

impl Default for ScreeningSettings {
    fn default() -> Self {
        Self {
            admission_threshold: 60.0,
            concurrency: 4,
        }
    }
}

/// Result of analysing one uploaded resume against a job's required skills.
#[derive(Debug, Serialize)]
pub struct SkillAnalysis {
    pub readiness_score: f64,
    pub similarity_score: f64,
    pub user_skills: SkillSet,
    pub job_skills: Vec<String>,
    pub skill_gaps: SkillSet,
    pub recommendations: CourseRecommendations,
    pub quizzes: Quizzes,
}

pub struct Screener {
    generator: Arc<dyn TextGenerator>,
    extractor: Arc<dyn TextExtractor>,
    blobs: Arc<dyn BlobStore>,
    store: Arc<dyn CandidateStore>,
    vocabulary: Arc<Vocabulary>,
    settings: ScreeningSettings,
}

/// Splits a comma-separated skill list, dropping blank entries.
pub fn parse_required_skills(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parses a JSON array of skill names. Anything else is logged and treated as no skills.
pub fn parse_job_skills_json(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(skills) => skills,
        Err(e) => {
            warn!("Invalid job_skills JSON, defaulting to []: {e}");
            Vec::new()
        }
    }
}

impl Screener {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        extractor: Arc<dyn TextExtractor>,
        blobs: Arc<dyn BlobStore>,
        store: Arc<dyn CandidateStore>,
        vocabulary: Arc<Vocabulary>,
        settings: ScreeningSettings,
    ) -> Self {
        Self {
            generator,
            extractor,
            blobs,
            store,
            vocabulary,
            settings,
        }
    }

    /// Single-resume flow: extract, score, and build a learning plan for the gaps.
    pub async fn analyze(
        &self,
        filename: &str,
        document: Bytes,
        job_description: &str,
        required_skills_csv: &str,
    ) -> Result<SkillAnalysis, AppError> {
        let format = DocumentFormat::from_filename(filename).map_err(|_| {
            AppError::InvalidFormat("Invalid file type. Only PDF and DOCX are supported.".to_string())
        })?;

        let text = self
            .extractor
            .extract_text(document, format)
            .await
            .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

        let user_skills = extract_skills(&text, &self.vocabulary, self.generator.as_ref()).await;
        if user_skills.is_empty() {
            return Err(AppError::NoSkillsFound);
        }

        let job_skills = parse_required_skills(required_skills_csv);
        let (skill_gaps, readiness_score) =
            gaps_and_score(user_skills.iter().map(Skill::as_str), &job_skills);
        let similarity_score = similarity(&[text.as_str()], job_description, &job_skills)
            .first()
            .copied()
            .unwrap_or(0.0);

        info!(
            readiness_score,
            user_skills = user_skills.len(),
            gaps = skill_gaps.len(),
            "Resume analysed"
        );

        let (recommendations, quizzes) = tokio::join!(
            recommend_courses(&skill_gaps, self.generator.as_ref()),
            generate_quizzes(&skill_gaps, self.generator.as_ref()),
        );

        Ok(SkillAnalysis {
            readiness_score,
            similarity_score,
            user_skills,
            job_skills,
            skill_gaps,
            recommendations,
            quizzes,
        })
    }

    /// Batch flow: screens every resume, ranks the admitted ones, persists the shortlist once.
    ///
    /// A resume that cannot be downloaded, read, or yields no skills is dropped without
    /// affecting the others. Persistence failure is logged; the ranking is still returned.
    pub async fn shortlist(
        &self,
        job_id: &JobId,
        job: &JobPosting,
        resume_urls: &[String],
    ) -> Vec<Candidate> {
        info!(
            %job_id,
            resumes = resume_urls.len(),
            concurrency = self.settings.concurrency,
            "Shortlisting candidates"
        );

        let job_set: SkillSet = job.skills.iter().collect();
        let units: Vec<_> = resume_urls
            .iter()
            .map(|url| self.screen_resume(url.as_str(), &job_set))
            .collect();
        let screened: Vec<Candidate> = stream::iter(units)
            .buffered(self.settings.concurrency.max(1))
            .filter_map(|candidate| async move { candidate })
            .collect()
            .await;

        let ranked = rank(screened, self.settings.admission_threshold, job);
        info!(%job_id, shortlisted = ranked.len(), "Shortlist ranked");

        if !ranked.is_empty() {
            if let Err(e) = self.store.insert_shortlist(job_id, &ranked).await {
                error!(%job_id, "Failed to store shortlisted candidates: {e}");
            }
        }

        ranked
    }

    async fn resolve_identity(&self, resume_url: &str) -> Identity {
        match self.store.find_application_by_resume_url(resume_url).await {
            Ok(Some(application)) => application.identity(),
            Ok(None) => {
                info!(resume_url, "No application record for resume");
                Identity::unknown()
            }
            Err(e) => {
                warn!(resume_url, "Application lookup failed: {e}");
                Identity::unknown()
            }
        }
    }

    /// download → extract text → extract skills → score. `None` means "not a candidate".
    async fn screen_resume(&self, resume_url: &str, job_set: &SkillSet) -> Option<Candidate> {
        let identity = self.resolve_identity(resume_url).await;

        let bytes = match self.blobs.fetch(resume_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(resume_url, "Skipping resume, download failed: {e}");
                return None;
            }
        };

        let text = match self
            .extractor
            .extract_text(bytes, DocumentFormat::from_url(resume_url))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(resume_url, "Skipping resume, unreadable document: {e}");
                return None;
            }
        };

        let skills = extract_skills(&text, &self.vocabulary, self.generator.as_ref()).await;
        if skills.is_empty() {
            info!(resume_url, "Skipping resume, no skills found");
            return None;
        }

        let (skill_gaps, readiness_score) = score_sets(&skills, job_set);
        info!(resume_url, readiness_score, "Resume scored");

        Some(Candidate {
            name: identity.name,
            email: identity.email,
            applied_date: identity.applied_date,
            resume_url: resume_url.to_string(),
            readiness_score,
            similarity_score: None,
            skills,
            skill_gaps,
            text,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::documents::DocumentError;
    use crate::llm_client::{GenerateOptions, LlmError};
    use crate::models::application::ApplicationRow;
    use crate::models::shortlist::ShortlistRow;
    use crate::storage::blob::BlobError;
    use crate::storage::StoreError;

    pub(crate) struct EchoModel(pub &'static str);

    #[async_trait]
    impl TextGenerator for EchoModel {
        async fn generate(&self, _: &str, _: &GenerateOptions) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    /// Treats document bytes as UTF-8 text; `b"%unreadable"` fails extraction.
    pub(crate) struct PlainText;

    #[async_trait]
    impl TextExtractor for PlainText {
        async fn extract_text(&self, bytes: Bytes, _: DocumentFormat) -> Result<String, DocumentError> {
            if bytes.starts_with(b"%unreadable") {
                return Err(DocumentError::Extraction("corrupt".to_string()));
            }
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }

    /// Serves resumes from memory after `delay`, tracking peak concurrent downloads.
    #[derive(Default)]
    pub(crate) struct MemoryBlobs {
        pub objects: HashMap<String, &'static str>,
        pub delay: Duration,
        pub in_flight: AtomicUsize,
        pub peak: AtomicUsize,
    }

    #[async_trait]
    impl BlobStore for MemoryBlobs {
        async fn fetch(&self, url: &str) -> Result<Bytes, BlobError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.objects
                .get(url)
                .map(|text| Bytes::from_static(text.as_bytes()))
                .ok_or_else(|| BlobError::NotFound(url.to_string()))
        }
    }

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub applications: Vec<ApplicationRow>,
        pub fail_inserts: bool,
        pub inserted: Mutex<Vec<(JobId, Vec<Candidate>)>>,
    }

    #[async_trait]
    impl CandidateStore for MemoryStore {
        async fn find_application_by_resume_url(
            &self,
            resume_url: &str,
        ) -> Result<Option<ApplicationRow>, StoreError> {
            Ok(self
                .applications
                .iter()
                .find(|a| a.resume_url == resume_url)
                .cloned())
        }

        async fn find_applications(&self, job_id: &str) -> Result<Vec<ApplicationRow>, StoreError> {
            Ok(self
                .applications
                .iter()
                .filter(|a| a.job_id == job_id)
                .cloned()
                .collect())
        }

        async fn insert_shortlist(
            &self,
            job_id: &JobId,
            candidates: &[Candidate],
        ) -> Result<(), StoreError> {
            if self.fail_inserts {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            self.inserted
                .lock()
                .unwrap()
                .push((job_id.clone(), candidates.to_vec()));
            Ok(())
        }

        async fn find_shortlist(&self, job_id: &JobId) -> Result<Vec<ShortlistRow>, StoreError> {
            let inserted = self.inserted.lock().unwrap();
            Ok(inserted
                .iter()
                .filter(|(id, _)| id == job_id)
                .flat_map(|(id, candidates)| {
                    candidates.iter().enumerate().map(move |(rank, c)| ShortlistRow {
                        id: Uuid::new_v4(),
                        internship_id: id.to_string(),
                        rank: rank as i32,
                        name: c.name.clone(),
                        email: c.email.clone(),
                        applied_date: c.applied_date.clone(),
                        resume_url: c.resume_url.clone(),
                        readiness_score: c.readiness_score,
                        similarity_score: c.similarity_score.unwrap_or(0.0),
                        skills: c.skills.to_strings(),
                        skill_gaps: c.skill_gaps.to_strings(),
                        text: c.text.clone(),
                        created_at: Utc::now(),
                    })
                })
                .collect())
        }
    }

    pub(crate) fn application(resume_url: &str, name: &str) -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            job_id: "65f1a2b3c4d5e6f708192a3b".to_string(),
            resume_url: resume_url.to_string(),
            user_name: Some(name.to_string()),
            user_email: Some(format!("{}@example.com", name.to_lowercase())),
            applied_date: Some("2024-05-01".to_string()),
            status: Some("applied".to_string()),
            created_at: Utc::now(),
        }
    }

    pub(crate) fn screener(blobs: MemoryBlobs, store: Arc<MemoryStore>) -> Screener {
        Screener::new(
            Arc::new(EchoModel("")),
            Arc::new(PlainText),
            Arc::new(blobs),
            store,
            Arc::new(Vocabulary::default_technical().unwrap()),
            ScreeningSettings::default(),
        )
    }

    fn job_id() -> JobId {
        "65f1a2b3c4d5e6f708192a3b".parse().unwrap()
    }

    fn job() -> JobPosting {
        JobPosting {
            description: "Backend engineer building cloud services".to_string(),
            skills: vec!["Python".to_string(), "AWS".to_string(), "Docker".to_string()],
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_analyze_rejects_unsupported_files() {
        let s = screener(MemoryBlobs::default(), Arc::new(MemoryStore::default()));
        let result = s
            .analyze("resume.txt", Bytes::from_static(b"Python"), "desc", "Python")
            .await;
        assert!(matches!(result, Err(AppError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_analyze_without_skills_fails() {
        let s = screener(MemoryBlobs::default(), Arc::new(MemoryStore::default()));
        let result = s
            .analyze("resume.pdf", Bytes::from_static(b"I like hiking"), "desc", "Python")
            .await;
        assert!(matches!(result, Err(AppError::NoSkillsFound)));
    }

    #[tokio::test]
    async fn test_analyze_unreadable_document() {
        let s = screener(MemoryBlobs::default(), Arc::new(MemoryStore::default()));
        let result = s
            .analyze("resume.docx", Bytes::from_static(b"%unreadable"), "desc", "Python")
            .await;
        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
    }

    #[tokio::test]
    async fn test_analyze_scores_gaps_and_plans_learning() {
        let s = screener(MemoryBlobs::default(), Arc::new(MemoryStore::default()));
        let analysis = s
            .analyze(
                "cv.PDF",
                Bytes::from_static(b"Python developer, deployed on AWS"),
                "Backend role",
                "Python, AWS , Docker,",
            )
            .await
            .unwrap();

        assert_eq!(analysis.readiness_score, 66.67);
        assert_eq!(analysis.job_skills, vec!["Python", "AWS", "Docker"]);
        assert_eq!(analysis.user_skills.to_strings(), vec!["aws", "python"]);
        assert_eq!(analysis.skill_gaps.to_strings(), vec!["docker"]);
        assert!(matches!(analysis.recommendations, CourseRecommendations::Courses { .. }));
        assert!(matches!(analysis.quizzes, Quizzes::Unparsed { .. }));
        assert!((0.0..=1.0).contains(&analysis.similarity_score));
    }

    #[tokio::test]
    async fn test_shortlist_ranks_filters_and_persists_once() {
        let mut blobs = MemoryBlobs::default();
        blobs.objects = HashMap::from([
            ("s3://b/strong.pdf".to_string(), "Python AWS Docker backend engineer cloud services"),
            ("s3://b/good.pdf".to_string(), "Python AWS Docker"),
            ("s3://b/weak.pdf".to_string(), "Python only"),
            ("s3://b/none.pdf".to_string(), "Sommelier"),
            ("s3://b/corrupt.pdf".to_string(), "%unreadable"),
        ]);
        let store = Arc::new(MemoryStore {
            applications: vec![application("s3://b/good.pdf", "Grace")],
            ..MemoryStore::default()
        });
        let s = screener(blobs, store.clone());

        let ranked = s
            .shortlist(
                &job_id(),
                &job(),
                &urls(&[
                    "s3://b/weak.pdf",
                    "s3://b/missing.pdf",
                    "s3://b/good.pdf",
                    "s3://b/none.pdf",
                    "s3://b/strong.pdf",
                    "s3://b/corrupt.pdf",
                ]),
            )
            .await;

        let order: Vec<_> = ranked.iter().map(|c| c.resume_url.as_str()).collect();
        assert_eq!(order, vec!["s3://b/strong.pdf", "s3://b/good.pdf"]);
        assert!(ranked.iter().all(|c| c.readiness_score > 60.0));
        assert!(ranked[0].similarity_score.unwrap() > ranked[1].similarity_score.unwrap());

        assert_eq!(ranked[1].name, "Grace");
        assert_eq!(ranked[1].email, "grace@example.com");
        assert_eq!(ranked[0].name, "N/A");

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].1, ranked);
    }

    #[tokio::test]
    async fn test_shortlist_survives_persistence_failure() {
        let mut blobs = MemoryBlobs::default();
        blobs.objects = HashMap::from([("s3://b/a.pdf".to_string(), "Python AWS Docker")]);
        let store = Arc::new(MemoryStore {
            fail_inserts: true,
            ..MemoryStore::default()
        });
        let s = screener(blobs, store);
        let ranked = s.shortlist(&job_id(), &job(), &urls(&["s3://b/a.pdf"])).await;
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].readiness_score, 100.0);
    }

    #[tokio::test]
    async fn test_empty_shortlist_is_not_persisted() {
        let store = Arc::new(MemoryStore::default());
        let s = screener(MemoryBlobs::default(), store.clone());
        let ranked = s.shortlist(&job_id(), &job(), &urls(&["s3://b/missing.pdf"])).await;
        assert!(ranked.is_empty());
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_concurrency_is_bounded() {
        let mut blobs = MemoryBlobs {
            delay: Duration::from_millis(50),
            ..MemoryBlobs::default()
        };
        let list: Vec<String> = (0..10).map(|i| format!("s3://b/{i}.pdf")).collect();
        for url in &list {
            blobs.objects.insert(url.clone(), "Python AWS Docker");
        }
        let blobs = Arc::new(blobs);
        let s = Screener::new(
            Arc::new(EchoModel("")),
            Arc::new(PlainText),
            blobs.clone(),
            Arc::new(MemoryStore::default()),
            Arc::new(Vocabulary::default_technical().unwrap()),
            ScreeningSettings {
                admission_threshold: 60.0,
                concurrency: 3,
            },
        );

        let ranked = s.shortlist(&job_id(), &job(), &list).await;
        assert_eq!(ranked.len(), 10);
        assert!(blobs.peak.load(Ordering::SeqCst) <= 3);
        assert!(blobs.peak.load(Ordering::SeqCst) >= 2);
        // identical scores keep request order
        let order: Vec<_> = ranked.iter().map(|c| c.resume_url.clone()).collect();
        assert_eq!(order, list);
    }

    #[test]
    fn test_required_skills_csv() {
        assert_eq!(parse_required_skills(" Python, ,AWS,"), vec!["Python", "AWS"]);
        assert!(parse_required_skills("").is_empty());
    }

    #[test]
    fn test_job_skills_json_falls_back_to_empty() {
        assert_eq!(parse_job_skills_json(r#"["Python", "AWS"]"#), vec!["Python", "AWS"]);
        assert!(parse_job_skills_json("Python, AWS").is_empty());
        assert!(parse_job_skills_json(r#"{"skills": []}"#).is_empty());
    }
}
