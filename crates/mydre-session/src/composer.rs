//! Output composition: preconditions and payload assembly for the
//! combine and create paths. Pure (no IO) so every gate is unit-testable;
//! the session submits the prepared payload through the gateway.

use bytes::Bytes;
use mydre_core::validation::{ensure_mydre_ext, validate_pin, DEFAULT_COMBINED_FILENAME};
use mydre_core::{AppError, WorkspaceBundle};

use crate::collection::WorkspaceCollection;

/// An encrypted file ready to be written out under its final name.
#[derive(Debug, Clone)]
pub struct EncryptedArtifact {
    pub filename: String,
    pub data: Bytes,
}

/// A validated combine payload.
#[derive(Debug, Clone)]
pub struct CombinePayload {
    pub filename: String,
    pub bundle: WorkspaceBundle,
}

/// Gate the combine action: PIN at least 6 characters, at least one
/// workspace, no duplicate names. Any violation blocks with a specific
/// error and nothing is submitted. An empty filename falls back to the
/// default; the `.mydre` extension is appended when missing.
pub fn prepare_combine(
    collection: &WorkspaceCollection,
    pin: &str,
    filename: &str,
) -> Result<CombinePayload, AppError> {
    validate_pin(pin)?;
    let bundle = collection.to_bundle()?;
    let filename = if filename.trim().is_empty() {
        DEFAULT_COMBINED_FILENAME.to_string()
    } else {
        ensure_mydre_ext(filename.trim())
    };
    Ok(CombinePayload { filename, bundle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mydre_core::WorkspaceCredentials;

    fn collection_with(names: &[&str]) -> WorkspaceCollection {
        let mut collection = WorkspaceCollection::new();
        for (i, name) in names.iter().enumerate() {
            let mut workspaces = std::collections::BTreeMap::new();
            workspaces.insert(
                name.to_string(),
                WorkspaceCredentials {
                    workspace_key: "k".into(),
                    subscription_key: "s".into(),
                    uploader_name: "u".into(),
                },
            );
            collection.merge(&format!("file{i}.mydre"), WorkspaceBundle { workspaces });
        }
        collection
    }

    #[test]
    fn extension_appended_to_output_name() {
        let payload = prepare_combine(&collection_with(&["A"]), "123456", "out").unwrap();
        assert_eq!(payload.filename, "out.mydre");
        assert_eq!(payload.bundle.len(), 1);
    }

    #[test]
    fn empty_name_falls_back_to_default() {
        let payload = prepare_combine(&collection_with(&["A"]), "123456", "  ").unwrap();
        assert_eq!(payload.filename, DEFAULT_COMBINED_FILENAME);
    }

    #[test]
    fn short_pin_blocks_combine() {
        let err = prepare_combine(&collection_with(&["A"]), "12345", "out").unwrap_err();
        assert!(matches!(err, AppError::PinTooShort { .. }));
    }

    #[test]
    fn empty_collection_blocks_combine() {
        let err = prepare_combine(&WorkspaceCollection::new(), "123456", "out").unwrap_err();
        assert!(matches!(err, AppError::EmptyCollection));
    }

    #[test]
    fn duplicates_block_combine() {
        let err = prepare_combine(&collection_with(&["Team", "Team"]), "123456", "out")
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateWorkspaces(_)));
    }
}
