//! File staging: the ordered collection of selected files and the folder
//! labels they are grouped by.

mod area;
mod folders;
mod types;

pub use area::StagingArea;
pub use folders::FolderSet;
pub use types::{
    FileId, FileStatus, SelectedFile, StagedFile, StagedFileView, DEFAULT_CONTENT_TYPE,
};
