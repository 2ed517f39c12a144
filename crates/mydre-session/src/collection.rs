//! The in-memory workspace collection.
//!
//! Entries are tagged with the file they came from. Duplicate workspace
//! names across different files are kept and flagged, never overwritten;
//! the only resolution path is removing one of them. Re-decrypting a file
//! replaces that file's earlier contribution.

use std::collections::{BTreeMap, BTreeSet};

use mydre_core::{AppError, FileStatus, WorkspaceBundle, WorkspaceCredentials, WorkspaceRecord};
use uuid::Uuid;

/// One workspace row: a decrypted credential set plus its provenance and
/// per-row upload status.
#[derive(Debug, Clone)]
pub struct WorkspaceEntry {
    pub id: Uuid,
    pub name: String,
    pub credentials: WorkspaceCredentials,
    pub source_file: String,
    pub upload_status: FileStatus,
}

impl WorkspaceEntry {
    /// Flat record for endpoints that take the single-workspace shape.
    pub fn to_record(&self) -> WorkspaceRecord {
        WorkspaceRecord {
            workspace_name: self.name.clone(),
            workspace_key: self.credentials.workspace_key.clone(),
            subscription_key: self.credentials.subscription_key.clone(),
            uploader_name: self.credentials.uploader_name.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct WorkspaceCollection {
    entries: Vec<WorkspaceEntry>,
}

impl WorkspaceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a decrypted bundle. Entries previously sourced from the same
    /// file are dropped first, so a re-decrypt replaces rather than
    /// stacks. Returns the ids of the entries added.
    pub fn merge(&mut self, source_file: &str, bundle: WorkspaceBundle) -> Vec<Uuid> {
        self.entries.retain(|e| e.source_file != source_file);
        let mut added = Vec::with_capacity(bundle.workspaces.len());
        for (name, credentials) in bundle.workspaces {
            let entry = WorkspaceEntry {
                id: Uuid::new_v4(),
                name,
                credentials,
                source_file: source_file.to_string(),
                upload_status: FileStatus::Pending,
            };
            added.push(entry.id);
            self.entries.push(entry);
        }
        added
    }

    pub fn entries(&self) -> &[WorkspaceEntry] {
        &self.entries
    }

    pub fn get(&self, id: Uuid) -> Option<&WorkspaceEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn set_upload_status(&mut self, id: Uuid, status: FileStatus) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.upload_status = status;
        }
    }

    /// Names that appear more than once.
    pub fn duplicate_names(&self) -> BTreeSet<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.name.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicate_names().is_empty()
    }

    /// Whether this entry shares its name with another entry (the rows
    /// rendered in red).
    pub fn is_duplicate(&self, id: Uuid) -> bool {
        self.get(id)
            .map(|entry| {
                self.entries
                    .iter()
                    .any(|other| other.id != id && other.name == entry.name)
            })
            .unwrap_or(false)
    }

    /// Remove one entry. Returns the removed entry, and whether it was
    /// the last one sourced from its file (the caller then reverts that
    /// file to pending so it can be decrypted again).
    pub fn remove_entry(&mut self, id: Uuid) -> Option<(WorkspaceEntry, bool)> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        let removed = self.entries.remove(index);
        let source_emptied = !self
            .entries
            .iter()
            .any(|e| e.source_file == removed.source_file);
        Some((removed, source_emptied))
    }

    /// Remove every entry sourced from a file. Returns how many went.
    pub fn remove_from_file(&mut self, source_file: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.source_file != source_file);
        before - self.entries.len()
    }

    /// Serialize the collection for output. Fails while duplicates exist
    /// or the collection is empty; no partial bundle is ever produced.
    pub fn to_bundle(&self) -> Result<WorkspaceBundle, AppError> {
        if self.entries.is_empty() {
            return Err(AppError::EmptyCollection);
        }
        let duplicates = self.duplicate_names();
        if !duplicates.is_empty() {
            return Err(AppError::DuplicateWorkspaces(
                duplicates.into_iter().collect(),
            ));
        }
        let mut workspaces = BTreeMap::new();
        for entry in &self.entries {
            workspaces.insert(entry.name.clone(), entry.credentials.clone());
        }
        Ok(WorkspaceBundle { workspaces })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(names: &[&str]) -> WorkspaceBundle {
        let mut workspaces = BTreeMap::new();
        for name in names {
            workspaces.insert(
                name.to_string(),
                WorkspaceCredentials {
                    workspace_key: format!("k-{name}"),
                    subscription_key: format!("s-{name}"),
                    uploader_name: "user".to_string(),
                },
            );
        }
        WorkspaceBundle { workspaces }
    }

    #[test]
    fn duplicates_detected_across_sources() {
        let mut collection = WorkspaceCollection::new();
        collection.merge("a.mydre", bundle(&["Team"]));
        collection.merge("b.mydre", bundle(&["Team", "Lab"]));
        assert!(collection.has_duplicates());
        assert_eq!(
            collection.duplicate_names().into_iter().collect::<Vec<_>>(),
            vec!["Team".to_string()]
        );
        // Both Team rows are flagged, Lab is not.
        let flagged: Vec<bool> = collection
            .entries()
            .iter()
            .map(|e| collection.is_duplicate(e.id))
            .collect();
        assert_eq!(
            flagged.len(),
            3,
        );
        assert_eq!(
            collection
                .entries()
                .iter()
                .filter(|e| collection.is_duplicate(e.id))
                .count(),
            2
        );
    }

    #[test]
    fn remerge_replaces_same_source() {
        let mut collection = WorkspaceCollection::new();
        collection.merge("a.mydre", bundle(&["Team"]));
        collection.merge("a.mydre", bundle(&["Team"]));
        assert_eq!(collection.len(), 1);
        assert!(!collection.has_duplicates());
    }

    #[test]
    fn to_bundle_blocked_by_duplicates() {
        let mut collection = WorkspaceCollection::new();
        collection.merge("a.mydre", bundle(&["Team"]));
        collection.merge("b.mydre", bundle(&["Team"]));
        let err = collection.to_bundle().unwrap_err();
        assert!(matches!(err, AppError::DuplicateWorkspaces(_)));

        // Removing one of the pair unblocks the combine.
        let id = collection.entries()[0].id;
        collection.remove_entry(id).unwrap();
        assert!(collection.to_bundle().is_ok());
    }

    #[test]
    fn to_bundle_requires_entries() {
        let collection = WorkspaceCollection::new();
        assert!(matches!(
            collection.to_bundle().unwrap_err(),
            AppError::EmptyCollection
        ));
    }

    #[test]
    fn remove_entry_reports_emptied_source() {
        let mut collection = WorkspaceCollection::new();
        collection.merge("a.mydre", bundle(&["Team", "Lab"]));
        let first = collection.entries()[0].id;
        let (_, emptied) = collection.remove_entry(first).unwrap();
        assert!(!emptied);
        let second = collection.entries()[0].id;
        let (_, emptied) = collection.remove_entry(second).unwrap();
        assert!(emptied);
    }

    #[test]
    fn remove_from_file_clears_only_that_source() {
        let mut collection = WorkspaceCollection::new();
        collection.merge("a.mydre", bundle(&["Team"]));
        collection.merge("b.mydre", bundle(&["Lab"]));
        assert_eq!(collection.remove_from_file("a.mydre"), 1);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.entries()[0].name, "Lab");
    }
}
