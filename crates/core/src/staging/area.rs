//! The ordered staging collection.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::preview::PreviewStore;

use super::folders::FolderSet;
use super::types::{FileId, FileStatus, SelectedFile, StagedFile, DEFAULT_CONTENT_TYPE};

/// Staged files in insertion order plus the folder set they are tagged from.
#[derive(Debug)]
pub struct StagingArea {
    files: Vec<StagedFile>,
    folders: FolderSet,
    previews: PreviewStore,
}

impl StagingArea {
    pub fn new(default_folder: impl Into<String>, previews: PreviewStore) -> Self {
        Self {
            files: Vec::new(),
            folders: FolderSet::new(default_folder),
            previews,
        }
    }

    /// Append one pending entry per selection, tagged with the active folder.
    pub fn stage(&mut self, selections: Vec<SelectedFile>) -> Vec<FileId> {
        let folder = self.folders.active().to_string();
        let mut ids = Vec::with_capacity(selections.len());

        for selection in selections {
            let content_type = selection
                .content_type
                .filter(|ct| !ct.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
            let content: Arc<[u8]> = Arc::from(selection.content);
            let preview = self.previews.acquire(&content_type, Arc::clone(&content));
            let id = FileId::next();

            debug!(id = %id, name = %selection.name, folder = %folder, "Staged file");

            self.files.push(StagedFile {
                id,
                name: selection.name,
                content_type,
                content,
                preview,
                folder: folder.clone(),
                status: FileStatus::Pending,
                progress: 0,
                staged_at: Utc::now(),
                uploaded_path: None,
                error: None,
            });
            ids.push(id);
        }

        ids
    }

    /// Drop the entry with `id`, releasing its preview.
    pub fn remove(&mut self, id: FileId) -> bool {
        match self.files.iter().position(|f| f.id == id) {
            Some(idx) => {
                // Vec::remove keeps the relative order of the rest.
                let removed = self.files.remove(idx);
                debug!(id = %removed.id, name = %removed.name, "Removed staged file");
                true
            }
            None => false,
        }
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    /// Mutable access to the entries; order and membership stay fixed.
    pub fn files_mut(&mut self) -> &mut [StagedFile] {
        &mut self.files
    }

    pub fn get(&self, id: FileId) -> Option<&StagedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: FileId) -> Option<&mut StagedFile> {
        self.files.iter_mut().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn folders(&self) -> &FolderSet {
        &self.folders
    }

    pub fn create_folder(&mut self, name: &str) -> bool {
        self.folders.create(name)
    }

    pub fn select_folder(&mut self, name: &str) -> bool {
        self.folders.select(name)
    }
}
