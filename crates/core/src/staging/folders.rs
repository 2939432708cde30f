//! Destination folder labels.

/// Append-only set of folder names with exactly one active entry.
#[derive(Debug, Clone)]
pub struct FolderSet {
    names: Vec<String>,
    active: usize,
}

impl FolderSet {
    /// Create a set containing only `initial`, which becomes active.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            names: vec![initial.into()],
            active: 0,
        }
    }

    /// Folder names in creation order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn active(&self) -> &str {
        &self.names[self.active]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Add a folder and make it active.
    ///
    /// Blank or already-known names are ignored; returns whether the set changed.
    pub fn create(&mut self, name: &str) -> bool {
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        self.active = self.names.len() - 1;
        true
    }

    /// Make an existing folder active. Unknown names are ignored.
    pub fn select(&mut self, name: &str) -> bool {
        match self.names.iter().position(|n| n == name) {
            Some(idx) => {
                self.active = idx;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_folder_is_active() {
        let folders = FolderSet::new("folder_1");
        assert_eq!(folders.active(), "folder_1");
        assert_eq!(folders.names(), ["folder_1"]);
    }

    #[test]
    fn test_create_adds_and_activates() {
        let mut folders = FolderSet::new("folder_1");
        assert!(folders.create("holiday"));
        assert_eq!(folders.active(), "holiday");
        assert_eq!(folders.names(), ["folder_1", "holiday"]);
    }

    #[test]
    fn test_create_rejects_blank_and_duplicate() {
        let mut folders = FolderSet::new("folder_1");
        folders.create("holiday");
        folders.select("folder_1");

        assert!(!folders.create(""));
        assert!(!folders.create("holiday"));
        assert!(!folders.create("folder_1"));

        assert_eq!(folders.names().len(), 2);
        assert_eq!(folders.active(), "folder_1");
    }

    #[test]
    fn test_select() {
        let mut folders = FolderSet::new("folder_1");
        folders.create("b");

        assert!(folders.select("folder_1"));
        assert_eq!(folders.active(), "folder_1");

        assert!(!folders.select("missing"));
        assert_eq!(folders.active(), "folder_1");
    }
}
