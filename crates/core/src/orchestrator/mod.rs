//! Upload orchestrator.
//!
//! Keeps the ordered collection of staged files for one user and uploads them
//! in batches:
//! - **Staging**: files are tagged with the active folder when selected
//! - **Batches**: every pending file is queued, then submitted one at a time
//! - **Progress**: per-file status plus aggregate progress, published as events

mod batch;
mod runner;
mod types;

pub use batch::{PendingBatch, BATCH_ABANDONED_ERROR};
pub use runner::{UploadCompleteCallback, UploadOrchestrator};
pub use types::{
    aggregate_progress, BatchRejected, BatchReport, FailedUpload, UploadEvent, UploaderSnapshot,
};
