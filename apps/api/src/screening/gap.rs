//! Skill gaps and readiness: set arithmetic over normalized skills.

use crate::screening::normalizer::SkillSet;

/// Rounds to two decimal places, the precision every readiness score is reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Returns the job skills the user lacks and the readiness score in [0, 100].
///
/// Both inputs may hold raw strings; they are normalized before comparison.
/// An empty job skill set scores 0 by definition.
pub fn gaps_and_score<U, J>(user_skills: U, job_skills: J) -> (SkillSet, f64)
where
    U: IntoIterator,
    U::Item: AsRef<str>,
    J: IntoIterator,
    J::Item: AsRef<str>,
{
    let user: SkillSet = user_skills.into_iter().collect();
    let job: SkillSet = job_skills.into_iter().collect();
    score_sets(&user, &job)
}

/// Same as `gaps_and_score` for sets that are already normalized.
pub fn score_sets(user: &SkillSet, job: &SkillSet) -> (SkillSet, f64) {
    let gap = job.difference(user);
    if job.is_empty() {
        return (gap, 0.0);
    }
    let matched = job.intersection_len(user) as f64;
    let score = round2(100.0 * matched / job.len() as f64);
    (gap, score.clamp(0.0, 100.0))
}
