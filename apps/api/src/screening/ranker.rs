//! Shortlist ranking: admission threshold, similarity attachment and deterministic ordering.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::screening::normalizer::SkillSet;
use crate::screening::similarity::similarity;

/// Placeholder for identity fields that could not be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

/// One resume under evaluation. Field names on the wire match what partner clients read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub email: String,
    #[serde(rename = "appliedDate")]
    pub applied_date: String,
    #[serde(rename = "resumeUrl")]
    pub resume_url: String,
    pub readiness_score: f64,
    pub similarity_score: Option<f64>,
    pub skills: SkillSet,
    pub skill_gaps: SkillSet,
    pub text: String,
}

/// The job a batch is ranked against.
#[derive(Debug, Clone, Default)]
pub struct JobPosting {
    pub description: String,
    pub skills: Vec<String>,
}

/// Builds the shortlist for `job`.
///
/// Duplicate resume URLs keep their first occurrence. Only candidates whose readiness
/// strictly exceeds `admission_threshold` are admitted; similarity is computed over the
/// admitted set alone, then the list is stably sorted by (readiness, similarity) descending.
pub fn rank(candidates: Vec<Candidate>, admission_threshold: f64, job: &JobPosting) -> Vec<Candidate> {
    let total = candidates.len();
    let mut seen = HashSet::new();
    let mut admitted: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.resume_url.clone()))
        .filter(|c| c.readiness_score > admission_threshold)
        .collect();

    let texts: Vec<&str> = admitted.iter().map(|c| c.text.as_str()).collect();
    let scores = similarity(&texts, &job.description, &job.skills);
    attach_similarity(&mut admitted, &scores);
    sort_candidates(&mut admitted);

    debug!(
        total,
        admitted = admitted.len(),
        admission_threshold,
        "Shortlist ranked"
    );
    admitted
}

/// Attaches scores positionally; candidates past the end of `scores` get 0.
pub(crate) fn attach_similarity(candidates: &mut [Candidate], scores: &[f64]) {
    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.similarity_score = Some(scores.get(i).copied().unwrap_or(0.0));
    }
}

/// Stable sort, highest readiness first, then highest similarity.
pub(crate) fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| compare_desc(a, b));
}

fn compare_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.readiness_score
        .total_cmp(&a.readiness_score)
        .then_with(|| {
            b.similarity_score
                .unwrap_or(0.0)
                .total_cmp(&a.similarity_score.unwrap_or(0.0))
        })
}
