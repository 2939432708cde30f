pub mod config;
pub mod gallery;
pub mod orchestrator;
pub mod preview;
pub mod staging;
pub mod testing;
pub mod uploader;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, GalleryConfig,
    SanitizedConfig, ServerConfig, UploadConfig,
};
pub use gallery::{GalleryClient, GalleryError};
pub use orchestrator::{
    BatchRejected, BatchReport, FailedUpload, PendingBatch, UploadCompleteCallback, UploadEvent,
    UploadOrchestrator, UploaderSnapshot,
};
pub use preview::{Preview, PreviewHandle, PreviewStore};
pub use staging::{FileId, FileStatus, SelectedFile, StagedFile, StagedFileView};
pub use uploader::{
    HttpUploader, UploadError, UploadMetadata, UploadReceipt, UploadRequest, Uploader,
};
