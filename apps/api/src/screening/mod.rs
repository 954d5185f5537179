// Resume screening: skill extraction, readiness scoring, learning plans and
// partner shortlists. The scoring modules are pure; `pipeline` wires them to the
// document, model, blob and store collaborators.

pub mod extractor;
pub mod gap;
pub mod handlers;
pub mod learning;
pub mod normalizer;
pub mod pipeline;
pub mod ranker;
pub mod similarity;
