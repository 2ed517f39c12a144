//! Client-side mirror of the server staging area (`/upload2/files`).
//!
//! Pure state: the CLI performs the HTTP calls and feeds the responses
//! in. Newly listed or staged files are pre-selected, as the original
//! page did.

use std::collections::{BTreeMap, BTreeSet};

use mydre_api_client::api::StagedFilesResponse;

#[derive(Debug, Default)]
pub struct StagedFileManager {
    /// filename → server-side path
    files: BTreeMap<String, String>,
    selected: BTreeSet<String>,
}

impl StagedFileManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb a listing or staging response, pre-selecting every file it
    /// names. Files already deselected by the user stay deselected only
    /// if they were already known.
    pub fn absorb(&mut self, response: &StagedFilesResponse) {
        for file in &response.files {
            let known = self.files.contains_key(&file.filename);
            self.files
                .insert(file.filename.clone(), file.path.clone());
            if !known {
                self.selected.insert(file.filename.clone());
            }
        }
    }

    pub fn select(&mut self, name: &str) -> bool {
        if self.files.contains_key(name) {
            self.selected.insert(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn deselect(&mut self, name: &str) {
        self.selected.remove(name);
    }

    /// Forget a file after the server confirmed its deletion.
    pub fn remove(&mut self, name: &str) -> bool {
        self.selected.remove(name);
        self.files.remove(name).is_some()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Selected (filename, server path) pairs in name order.
    pub fn selected_files(&self) -> Vec<(String, String)> {
        self.files
            .iter()
            .filter(|(name, _)| self.selected.contains(*name))
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mydre_api_client::api::StagedFile;

    fn listing(names: &[&str]) -> StagedFilesResponse {
        StagedFilesResponse {
            status: "success".into(),
            files: names
                .iter()
                .map(|n| StagedFile {
                    filename: n.to_string(),
                    path: format!("/uploads/{n}"),
                })
                .collect(),
        }
    }

    #[test]
    fn new_files_are_preselected() {
        let mut manager = StagedFileManager::new();
        manager.absorb(&listing(&["a.csv", "b.csv"]));
        assert!(manager.is_selected("a.csv"));
        assert_eq!(manager.selected_files().len(), 2);
    }

    #[test]
    fn deselection_survives_refresh() {
        let mut manager = StagedFileManager::new();
        manager.absorb(&listing(&["a.csv"]));
        manager.deselect("a.csv");
        manager.absorb(&listing(&["a.csv", "b.csv"]));
        assert!(!manager.is_selected("a.csv"));
        assert!(manager.is_selected("b.csv"));
    }

    #[test]
    fn remove_clears_selection() {
        let mut manager = StagedFileManager::new();
        manager.absorb(&listing(&["a.csv"]));
        assert!(manager.remove("a.csv"));
        assert!(manager.is_empty());
        assert!(manager.selected_files().is_empty());
        assert!(!manager.remove("a.csv"));
    }
}
