//! Skill extraction: keyword pass over a fixed vocabulary, confirmed and extended by the LLM.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use tracing::{debug, info, warn};

use crate::llm_client::prompts::SKILL_EXTRACTION_PROMPT;
use crate::llm_client::{GenerateOptions, TextGenerator};
use crate::screening::normalizer::{normalize, Skill, SkillSet};

/// Technical skills recognised out of the box. Spelling variants are listed on purpose:
/// the keyword pass matches them verbatim and normalization folds them together.
pub const DEFAULT_TECH_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "node.js",
    "django",
    "flask",
    "c++",
    "c#",
    "sql",
    "postgresql",
    "mongodb",
    "html",
    "css",
    "aws",
    "azure",
    "docker",
    "kubernetes",
    "tensorflow",
    "pandas",
    "numpy",
    "git",
    "agile",
    "scrum",
    "jira",
    "rest api",
    "graphql",
    "machine learning",
    "express.js",
    "expressjs",
    "react.js",
    "reactjs",
    "nodejs",
];

struct VocabularyTerm {
    term: String,
    pattern: Regex,
}

/// The known skill vocabulary, with one compiled matcher per term.
pub struct Vocabulary {
    terms: Vec<VocabularyTerm>,
    normalized: HashSet<Skill>,
}

impl Vocabulary {
    pub fn new<I, S>(terms: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        let mut normalized = HashSet::new();
        let mut seen = HashSet::new();

        for raw in terms {
            let term = raw.as_ref().trim().to_lowercase();
            if term.is_empty() || !seen.insert(term.clone()) {
                continue;
            }
            let skill = normalize(&term);
            if skill.is_empty() {
                continue;
            }
            let pattern = RegexBuilder::new(&regex::escape(&term))
                .case_insensitive(true)
                .build()?;
            normalized.insert(skill);
            compiled.push(VocabularyTerm { term, pattern });
        }

        Ok(Self {
            terms: compiled,
            normalized,
        })
    }

    pub fn default_technical() -> Result<Self, regex::Error> {
        Self::new(DEFAULT_TECH_SKILLS.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if `skill` is the normalized form of some vocabulary term.
    pub fn confirms(&self, skill: &Skill) -> bool {
        self.normalized.contains(skill)
    }

    /// Vocabulary terms that occur as whole words in `text`, verbatim.
    pub fn keyword_hits<'a>(&'a self, text: &str) -> Vec<&'a str> {
        self.terms
            .iter()
            .filter(|t| {
                t.pattern
                    .find_iter(text)
                    .any(|m| is_whole_word(text, m.start(), m.end()))
            })
            .map(|t| t.term.as_str())
            .collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_joiner(c: char) -> bool {
    matches!(c, '.' | '+' | '#')
}

/// A match is a whole word when it is not glued to neighbouring word characters.
/// A `.`, `+` or `#` that joins the match to more word characters counts as glue,
/// so `react` does not match inside `React.js`, but does match `React.` at a sentence end.
fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let mut before = text[..start].chars().rev();
    let prev_ok = match before.next() {
        None => true,
        Some(c) if is_word_char(c) => false,
        Some(c) if is_joiner(c) => !before.next().is_some_and(is_word_char),
        Some(_) => true,
    };

    let mut after = text[end..].chars();
    let next_ok = match after.next() {
        None => true,
        Some(c) if is_word_char(c) => false,
        Some(c) if is_joiner(c) => !after.next().is_some_and(is_word_char),
        Some(_) => true,
    };

    prev_ok && next_ok
}

/// Extracts the candidate's skills from resume text.
///
/// 1. Keyword pass: every vocabulary term found as a whole word.
/// 2. Augmentation: the generator is asked for a comma-separated list; each entry is kept
///    only if its normalized form is a vocabulary term. The model can confirm known skills
///    but never introduce new ones.
///
/// A failed generation is logged and the keyword result is returned on its own.
pub async fn extract_skills(
    resume_text: &str,
    vocabulary: &Vocabulary,
    generator: &dyn TextGenerator,
) -> SkillSet {
    let mut skills: SkillSet = vocabulary.keyword_hits(resume_text).into_iter().collect();
    debug!(keyword_hits = skills.len(), "Keyword pass complete");

    if resume_text.trim().is_empty() {
        return skills;
    }

    let prompt = SKILL_EXTRACTION_PROMPT.replace("{resume_text}", resume_text);
    match generator.generate(&prompt, &GenerateOptions::default()).await {
        Ok(reply) => {
            let mut confirmed = 0;
            for token in reply.trim().split(", ") {
                let skill = normalize(token);
                if vocabulary.confirms(&skill) && skills.insert(skill) {
                    confirmed += 1;
                }
            }
            info!(confirmed, "Additional skills confirmed by the model");
        }
        Err(e) => {
            warn!("Skill augmentation failed, using keyword matches only: {e}");
        }
    }

    skills
}
