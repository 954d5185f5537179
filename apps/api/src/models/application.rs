use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::screening::ranker::NOT_AVAILABLE;

/// A job application as recorded by the applications service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: String,
    #[serde(rename = "resumeUrl")]
    pub resume_url: String,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    #[serde(rename = "userEmail")]
    pub user_email: Option<String>,
    #[serde(rename = "appliedDate")]
    pub applied_date: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Candidate identity resolved from an application, "N/A" where unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub applied_date: String,
}

impl Identity {
    pub fn unknown() -> Self {
        Self {
            name: NOT_AVAILABLE.to_string(),
            email: NOT_AVAILABLE.to_string(),
            applied_date: NOT_AVAILABLE.to_string(),
        }
    }
}

fn or_not_available(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

impl ApplicationRow {
    pub fn identity(&self) -> Identity {
        Identity {
            name: or_not_available(self.user_name.as_deref()),
            email: or_not_available(self.user_email.as_deref()),
            applied_date: or_not_available(self.applied_date.as_deref()),
        }
    }
}
