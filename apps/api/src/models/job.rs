use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid job id '{0}': expected 24 hexadecimal characters")]
pub struct InvalidJobId(pub String);

/// Identifier of a job posting: a 24-character hexadecimal object id, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for JobId {
    type Err = InvalidJobId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 24 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(JobId(trimmed.to_ascii_lowercase()))
        } else {
            Err(InvalidJobId(s.to_string()))
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
