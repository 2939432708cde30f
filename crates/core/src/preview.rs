//! In-memory previews for staged files.
//!
//! A [`PreviewHandle`] is handed out when a file is staged and owned by the
//! staged entry. Dropping the handle releases the preview, so removing a file
//! from the collection (or dropping the whole orchestrator) frees it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

/// A preview resolved from the store.
#[derive(Debug, Clone)]
pub struct Preview {
    pub content_type: String,
    pub data: Arc<[u8]>,
}

/// Shared registry of live previews, addressable by token.
#[derive(Debug, Clone, Default)]
pub struct PreviewStore {
    entries: Arc<Mutex<HashMap<String, Preview>>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preview and return the handle that keeps it alive.
    pub fn acquire(&self, content_type: &str, data: Arc<[u8]>) -> PreviewHandle {
        let token = Uuid::new_v4().simple().to_string();
        self.lock().insert(
            token.clone(),
            Preview {
                content_type: content_type.to_string(),
                data,
            },
        );

        PreviewHandle {
            token,
            store: self.clone(),
        }
    }

    /// Look up a live preview.
    pub fn get(&self, token: &str) -> Option<Preview> {
        self.lock().get(token).cloned()
    }

    /// Number of previews currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, token: &str) {
        self.lock().remove(token);
    }

    // Map updates are single calls, so a poisoned lock still guards a consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Preview>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Owning reference to a preview; releases it on drop.
pub struct PreviewHandle {
    token: String,
    store: PreviewStore,
}

impl PreviewHandle {
    /// Token used to address the preview (e.g. `/previews/{token}`).
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.token).finish()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.release(&self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_resolve() {
        let store = PreviewStore::new();
        let handle = store.acquire("image/png", Arc::from(vec![1u8, 2, 3]));

        let preview = store.get(handle.token()).unwrap();
        assert_eq!(preview.content_type, "image/png");
        assert_eq!(&*preview.data, &[1, 2, 3]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_drop_releases_preview() {
        let store = PreviewStore::new();
        let handle = store.acquire("image/jpeg", Arc::from(vec![0u8; 4]));
        let token = handle.token().to_string();

        drop(handle);

        assert!(store.get(&token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_tokens_are_distinct() {
        let store = PreviewStore::new();
        let data: Arc<[u8]> = Arc::from(vec![9u8]);
        let a = store.acquire("image/png", Arc::clone(&data));
        let b = store.acquire("image/png", data);

        assert_ne!(a.token(), b.token());
        assert_eq!(store.len(), 2);
    }
}
