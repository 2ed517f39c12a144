use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Fallback name when a decrypted single-workspace record carries no
/// workspace name.
pub const DEFAULT_WORKSPACE_NAME: &str = "Workspace";

/// Credentials for one upload destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceCredentials {
    pub workspace_key: String,
    pub subscription_key: String,
    pub uploader_name: String,
}

/// Flat "single workspace" record: the shape `/config/decrypt` returns for
/// a file created from the create form, and the shape `/config/create`
/// accepts (minus the PIN).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    #[serde(default)]
    pub workspace_name: String,
    pub workspace_key: String,
    pub subscription_key: String,
    pub uploader_name: String,
}

impl WorkspaceRecord {
    pub fn credentials(&self) -> WorkspaceCredentials {
        WorkspaceCredentials {
            workspace_key: self.workspace_key.clone(),
            subscription_key: self.subscription_key.clone(),
            uploader_name: self.uploader_name.clone(),
        }
    }

    /// All four fields must be non-empty before the record is accepted
    /// for output.
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("workspace_name", &self.workspace_name),
            ("workspace_key", &self.workspace_key),
            ("subscription_key", &self.subscription_key),
            ("uploader_name", &self.uploader_name),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "Missing required field: {}",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// The `.mydre` plaintext payload: workspace name to credentials. This is
/// the one internal shape; single-workspace responses are normalized into
/// it at the deserialization boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceBundle {
    pub workspaces: BTreeMap<String, WorkspaceCredentials>,
}

impl WorkspaceBundle {
    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }
}

/// A decrypt response in either wire shape. `Multi` matches when the body
/// has a `workspaces` key, otherwise the flat record is tried.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DecryptedConfig {
    Multi(WorkspaceBundle),
    Single(WorkspaceRecord),
}

impl DecryptedConfig {
    /// Normalize into the multi-workspace shape. A single record with an
    /// empty name lands under [`DEFAULT_WORKSPACE_NAME`].
    pub fn into_bundle(self) -> WorkspaceBundle {
        match self {
            DecryptedConfig::Multi(bundle) => bundle,
            DecryptedConfig::Single(record) => {
                let name = if record.workspace_name.is_empty() {
                    DEFAULT_WORKSPACE_NAME.to_string()
                } else {
                    record.workspace_name.clone()
                };
                let mut workspaces = BTreeMap::new();
                workspaces.insert(name, record.credentials());
                WorkspaceBundle { workspaces }
            }
        }
    }

    /// Parse a decrypted payload. The `/upload2/decrypt` endpoint returns
    /// the plaintext as a JSON string inside the envelope, so one level of
    /// string nesting is unwrapped before deserializing.
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let value = match value {
            serde_json::Value::String(inner) => serde_json::from_str(&inner)?,
            other => other,
        };
        serde_json::from_value(value).map_err(AppError::from)
    }
}
