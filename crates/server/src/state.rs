use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use photodrop_core::{
    Config, GalleryClient, PreviewStore, SanitizedConfig, UploadCompleteCallback,
    UploadOrchestrator, Uploader, UploaderSnapshot,
};

/// Shared application state
pub struct AppState {
    config: Config,
    uploader: Arc<dyn Uploader>,
    gallery: Option<GalleryClient>,
    previews: PreviewStore,
    /// Upload sessions by username. Created by the first mutating request,
    /// dropped again once idle and empty.
    sessions: RwLock<HashMap<String, Arc<UploadOrchestrator>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        uploader: Arc<dyn Uploader>,
        gallery: Option<GalleryClient>,
    ) -> Self {
        Self {
            config,
            uploader,
            gallery,
            previews: PreviewStore::new(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Request body limit in bytes.
    pub fn max_body_bytes(&self) -> usize {
        self.config.server.max_body_mb as usize * 1024 * 1024
    }

    pub fn gallery(&self) -> Option<&GalleryClient> {
        self.gallery.as_ref()
    }

    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }

    /// Get the upload session for `username`, creating it if needed.
    pub async fn session(&self, username: &str) -> Arc<UploadOrchestrator> {
        if let Some(session) = self.sessions.read().await.get(username) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        // Another request may have created it between the two locks.
        if let Some(session) = sessions.get(username) {
            return Arc::clone(session);
        }

        let owner = username.to_string();
        let on_complete: UploadCompleteCallback = Arc::new(move |paths: &[String]| {
            info!(username = %owner, uploaded = paths.len(), "Upload complete");
        });
        let session = Arc::new(
            UploadOrchestrator::new(
                username,
                self.config.upload.default_folder.clone(),
                Arc::clone(&self.uploader),
                self.previews.clone(),
            )
            .with_completion_callback(on_complete),
        );
        sessions.insert(username.to_string(), Arc::clone(&session));
        info!(username = %username, uploader = %self.uploader.name(), "Upload session created");
        session
    }

    /// Get an existing session without creating one.
    pub async fn existing_session(&self, username: &str) -> Option<Arc<UploadOrchestrator>> {
        self.sessions.read().await.get(username).cloned()
    }

    /// Display state for `username`; a user without a session sees the
    /// state a fresh one would have.
    pub async fn snapshot(&self, username: &str) -> UploaderSnapshot {
        match self.existing_session(username).await {
            Some(session) => session.snapshot().await,
            None => self.default_snapshot(username),
        }
    }

    /// Snapshot of a session that has never been touched.
    pub fn default_snapshot(&self, username: &str) -> UploaderSnapshot {
        let folder = self.config.upload.default_folder.clone();
        UploaderSnapshot {
            username: username.to_string(),
            files: Vec::new(),
            folders: vec![folder.clone()],
            active_folder: folder,
            uploading: false,
            progress: 0,
        }
    }

    /// Drop the session for `username` if nothing else holds it and it has
    /// no batch, files or extra folders. Returns whether it was dropped.
    pub async fn evict_if_idle(&self, username: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let idle = match sessions.get(username) {
            // The map's reference is the only one left.
            Some(session) => Arc::strong_count(session) == 1 && session.is_idle_and_empty().await,
            None => false,
        };
        if idle {
            sessions.remove(username);
            debug!(username = %username, "Upload session dropped");
        }
        idle
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
