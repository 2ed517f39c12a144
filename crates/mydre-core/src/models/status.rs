use serde::{Deserialize, Serialize};

/// Decryption state of an intake file. The canonical status lives here;
/// any rendering (icons, report lines) derives from it, never the other
/// way around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Success,
    Error,
}

impl FileStatus {
    /// Only pending and failed files accept a new decryption attempt;
    /// successfully decrypted files are inert until removed.
    pub fn accepts_decrypt(&self) -> bool {
        matches!(self, FileStatus::Pending | FileStatus::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rows_reject_redecrypt() {
        assert!(FileStatus::Pending.accepts_decrypt());
        assert!(FileStatus::Error.accepts_decrypt());
        assert!(!FileStatus::Success.accepts_decrypt());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FileStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
