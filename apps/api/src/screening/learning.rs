//! Learning plan for skill gaps: course suggestions and quiz questions.
//!
//! Both are best-effort pass-through of model output. Neither can fail the request;
//! every failure mode maps onto a documented fallback shape.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::llm_client::prompts::{COURSE_PROMPT, QUIZ_PROMPT};
use crate::llm_client::{GenerateOptions, TextGenerator};
use crate::screening::normalizer::SkillSet;

const FALLBACK_SUGGESTIONS: &[&str] = &[
    "Coursera: https://www.coursera.org",
    "Udemy: https://www.udemy.com",
    "edX: https://www.edx.org",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CourseRecommendations {
    NoGaps { message: String },
    Courses { courses: Vec<String> },
    Fallback { error: String, suggestions: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Quizzes {
    Questions(Vec<Value>),
    Unparsed { error: String, raw: String },
}

fn gap_list(gaps: &SkillSet) -> String {
    gaps.to_strings().join(", ")
}

pub async fn recommend_courses(gaps: &SkillSet, generator: &dyn TextGenerator) -> CourseRecommendations {
    if gaps.is_empty() {
        return CourseRecommendations::NoGaps {
            message: "No skill gaps detected.".to_string(),
        };
    }

    let prompt = COURSE_PROMPT.replace("{skills}", &gap_list(gaps));
    match generator.generate(&prompt, &GenerateOptions::default()).await {
        Ok(reply) => {
            let courses: Vec<String> = reply
                .trim()
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
            info!(count = courses.len(), "Course recommendations generated");
            CourseRecommendations::Courses { courses }
        }
        Err(e) => {
            warn!("Course recommendation failed: {e}");
            CourseRecommendations::Fallback {
                error: "Course recommendations are temporarily unavailable.".to_string(),
                suggestions: FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            }
        }
    }
}

pub async fn generate_quizzes(gaps: &SkillSet, generator: &dyn TextGenerator) -> Quizzes {
    if gaps.is_empty() {
        return Quizzes::Questions(Vec::new());
    }

    let prompt = QUIZ_PROMPT.replace("{skills}", &gap_list(gaps));
    match generator.generate(&prompt, &GenerateOptions::default()).await {
        Ok(reply) => parse_quiz_reply(&reply),
        Err(e) => {
            warn!("Quiz generation failed: {e}");
            Quizzes::Unparsed {
                error: "Quiz generation is temporarily unavailable.".to_string(),
                raw: String::new(),
            }
        }
    }
}

/// The span from the first `[` to the last `]`, if any.
fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_quiz_reply(reply: &str) -> Quizzes {
    let Some(json_text) = extract_json_array(reply) else {
        warn!("No JSON array in quiz reply");
        return Quizzes::Unparsed {
            error: "Could not find valid JSON in the model response.".to_string(),
            raw: reply.to_string(),
        };
    };

    match serde_json::from_str::<Vec<Value>>(json_text) {
        Ok(questions) => Quizzes::Questions(questions),
        Err(e) => {
            warn!("Quiz reply is not a valid JSON array: {e}");
            Quizzes::Unparsed {
                error: "Invalid JSON format from the model.".to_string(),
                raw: reply.to_string(),
            }
        }
    }
}
