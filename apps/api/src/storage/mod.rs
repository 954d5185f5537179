// External collaborators that hold data: resume blobs in S3, applications and
// shortlists in PostgreSQL. Both sit behind traits so pipelines can run on fakes.

pub mod blob;
pub mod store;

pub use blob::{BlobStore, S3BlobStore};
pub use store::{CandidateStore, PgCandidateStore, StoreError};
