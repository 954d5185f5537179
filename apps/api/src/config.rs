use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    /// Custom S3 endpoint (MinIO locally). Unset means AWS.
    pub s3_endpoint: Option<String>,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub admission_threshold: f64,
    pub batch_concurrency: usize,
    pub llm_timeout: Duration,
    pub blob_timeout: Duration,
    /// Largest accepted resume upload, in bytes.
    pub max_upload_bytes: usize,
    /// Replaces the built-in skill vocabulary when set.
    pub skill_vocabulary: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let batch_concurrency: usize = parse_or(&lookup, "BATCH_CONCURRENCY", 4)?;
        anyhow::ensure!(batch_concurrency > 0, "BATCH_CONCURRENCY must be at least 1");

        let admission_threshold: f64 = parse_or(&lookup, "SHORTLIST_ADMISSION_THRESHOLD", 60.0)?;
        anyhow::ensure!(
            admission_threshold.is_finite() && (0.0..=100.0).contains(&admission_threshold),
            "SHORTLIST_ADMISSION_THRESHOLD must be a number between 0 and 100"
        );

        let max_upload_bytes: usize = parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;
        anyhow::ensure!(max_upload_bytes > 0, "MAX_UPLOAD_BYTES must be at least 1");

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            aws_region: optional("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            s3_endpoint: optional("S3_ENDPOINT"),
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            admission_threshold,
            batch_concurrency,
            llm_timeout: Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?),
            blob_timeout: Duration::from_secs(parse_or(&lookup, "BLOB_TIMEOUT_SECS", 30)?),
            max_upload_bytes,
            skill_vocabulary: optional("SKILL_VOCABULARY").map(|csv| {
                csv.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            }),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        _ => Ok(default),
    }
}
