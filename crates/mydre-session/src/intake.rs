//! File intake: the drop-zone equivalent.
//!
//! Accepts candidate files, filters them by the `.mydre` extension and
//! de-duplicates by filename. A second add of the same name is a no-op.

use std::collections::BTreeMap;

use mydre_core::validation::{is_key_file, KEY_FILE_EXT};
use mydre_core::{AppError, FileStatus};

/// What to do with a file that does not carry the `.mydre` extension.
/// The original pages disagreed (some warn and skip, one blocks with an
/// alert), so the policy is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakePolicy {
    /// Log a warning and drop the file.
    Skip,
    /// Fail the whole add with an error.
    Reject,
}

/// An accepted file and its decryption status.
#[derive(Debug, Clone)]
pub struct IntakeFile {
    pub name: String,
    pub data: Vec<u8>,
    pub status: FileStatus,
}

/// Result of one `add_files` call.
#[derive(Debug, Default, Clone)]
pub struct IntakeOutcome {
    pub added: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug)]
pub struct FileIntake {
    policy: IntakePolicy,
    files: BTreeMap<String, IntakeFile>,
}

impl FileIntake {
    pub fn new(policy: IntakePolicy) -> Self {
        Self {
            policy,
            files: BTreeMap::new(),
        }
    }

    /// Add candidate files. Wrong-extension handling follows the policy;
    /// names already present are skipped regardless of policy.
    pub fn add_files(
        &mut self,
        candidates: Vec<(String, Vec<u8>)>,
    ) -> Result<IntakeOutcome, AppError> {
        let mut outcome = IntakeOutcome::default();
        for (name, data) in candidates {
            if !is_key_file(&name) {
                match self.policy {
                    IntakePolicy::Skip => {
                        tracing::warn!(file = %name, "Skipping file: not a {} file", KEY_FILE_EXT);
                        outcome.skipped.push(name);
                        continue;
                    }
                    IntakePolicy::Reject => {
                        return Err(AppError::InvalidInput(format!(
                            "Please select a {} file (got {})",
                            KEY_FILE_EXT, name
                        )));
                    }
                }
            }
            if self.files.contains_key(&name) {
                tracing::warn!(file = %name, "File already added");
                outcome.skipped.push(name);
                continue;
            }
            self.files.insert(
                name.clone(),
                IntakeFile {
                    name: name.clone(),
                    data,
                    status: FileStatus::Pending,
                },
            );
            outcome.added.push(name);
        }
        Ok(outcome)
    }

    pub fn get(&self, name: &str) -> Option<&IntakeFile> {
        self.files.get(name)
    }

    pub fn set_status(&mut self, name: &str, status: FileStatus) -> Result<(), AppError> {
        let file = self
            .files
            .get_mut(name)
            .ok_or_else(|| AppError::NotFound(format!("File not in intake: {}", name)))?;
        file.status = status;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<IntakeFile> {
        self.files.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntakeFile> {
        self.files.values()
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

    fn candidates(names: &[&str]) -> Vec<(String, Vec<u8>)> {
        names.iter().map(|n| (n.to_string(), vec![1, 2, 3])).collect()
    }

    #[test]
    fn duplicate_name_is_a_noop() {
        let mut intake = FileIntake::new(IntakePolicy::Skip);
        intake.add_files(candidates(&["a.mydre"])).unwrap();
        let outcome = intake.add_files(candidates(&["a.mydre"])).unwrap();
        assert!(outcome.added.is_empty());
        assert_eq!(outcome.skipped, vec!["a.mydre"]);
        assert_eq!(intake.len(), 1);
    }

    #[test]
    fn skip_policy_drops_wrong_extension() {
        let mut intake = FileIntake::new(IntakePolicy::Skip);
        let outcome = intake
            .add_files(candidates(&["a.mydre", "notes.txt"]))
            .unwrap();
        assert_eq!(outcome.added, vec!["a.mydre"]);
        assert_eq!(outcome.skipped, vec!["notes.txt"]);
    }

    #[test]
    fn reject_policy_fails_on_wrong_extension() {
        let mut intake = FileIntake::new(IntakePolicy::Reject);
        let err = intake.add_files(candidates(&["notes.txt"])).unwrap_err();
        assert!(err.to_string().contains("notes.txt"));
        assert!(intake.is_empty());
    }

    #[test]
    fn new_files_start_pending() {
        let mut intake = FileIntake::new(IntakePolicy::Skip);
        intake.add_files(candidates(&["a.mydre"])).unwrap();
        assert_eq!(intake.get("a.mydre").unwrap().status, FileStatus::Pending);
    }

    #[test]
    fn set_status_on_unknown_file_errors() {
        let mut intake = FileIntake::new(IntakePolicy::Skip);
        let err = intake.set_status("ghost.mydre", FileStatus::Error).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
