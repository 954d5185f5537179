use std::sync::Arc;

use crate::screening::pipeline::Screener;
use crate::storage::CandidateStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub screener: Arc<Screener>,
    /// Read access for the shortlist and application listing endpoints.
    pub store: Arc<dyn CandidateStore>,
    /// Body limit for resume uploads.
    pub max_upload_bytes: usize,
}
