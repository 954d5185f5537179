//! Canonical form for free-text skill mentions.
//!
//! Every comparison between resume skills and job skills goes through
//! `normalize`, so "Node.JS", "NODEJS" and " nodejs " all land on `node.js`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Post-strip spellings that map onto a canonical name.
const ALIASES: &[(&str, &str)] = &[
    ("nodejs", "node.js"),
    ("expressjs", "express.js"),
    ("reactjs", "react.js"),
];

/// A normalized skill token. Only constructed through `normalize`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Skill(String);

impl Skill {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases, trims, drops every char outside `[a-z0-9.#+]`, then applies the alias table.
/// Total: empty or whitespace-only input yields an empty skill.
pub fn normalize(raw: &str) -> Skill {
    let stripped: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '#' | '+'))
        .collect();

    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == stripped)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(stripped);

    Skill(canonical)
}

/// A set of normalized skills. Empty skills are discarded on insert.
///
/// Backed by a `BTreeSet` so serialized output is sorted and stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet(BTreeSet<Skill>);

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes `raw` and inserts it. Returns false if it was empty or already present.
    pub fn insert_raw(&mut self, raw: &str) -> bool {
        self.insert(normalize(raw))
    }

    pub fn insert(&mut self, skill: Skill) -> bool {
        if skill.is_empty() {
            return false;
        }
        self.0.insert(skill)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.0.iter()
    }

    pub fn intersection_len(&self, other: &SkillSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    /// Skills in `self` that are absent from `other`.
    pub fn difference(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.difference(&other.0).cloned().collect())
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|s| s.0.clone()).collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for raw in iter {
            set.insert_raw(raw.as_ref());
        }
        set
    }
}
