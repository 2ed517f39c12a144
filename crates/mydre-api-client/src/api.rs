//! Domain methods for the myDRE configuration API.
//!
//! Request/response DTOs mirror the server's wire shapes; decrypt
//! responses are normalized into [`DecryptedConfig`] right here at the
//! boundary so nothing downstream branches on the single/multi shape.

use bytes::Bytes;
use mydre_core::{AppError, DecryptedConfig, WorkspaceBundle, WorkspaceRecord};
use reqwest::multipart::{Form, Part};

use crate::{api_prefix, ApiClient};

/// JSON body for POST /config/create.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConfigCreateRequest {
    pub workspace_name: String,
    pub workspace_key: String,
    pub subscription_key: String,
    pub uploader_name: String,
    pub pin: String,
}

impl ConfigCreateRequest {
    pub fn new(record: &WorkspaceRecord, pin: &str) -> Self {
        Self {
            workspace_name: record.workspace_name.clone(),
            workspace_key: record.workspace_key.clone(),
            subscription_key: record.subscription_key.clone(),
            uploader_name: record.uploader_name.clone(),
            pin: pin.to_string(),
        }
    }
}

/// Status envelope returned by the upload and staged-file endpoints.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// One file in the server-side staging area.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StagedFile {
    pub filename: String,
    pub path: String,
}

/// Response of GET/POST /upload2/files.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StagedFilesResponse {
    pub status: String,
    #[serde(default)]
    pub files: Vec<StagedFile>,
}

/// Envelope of POST /upload2/decrypt: 200 with `status: "error"` on a bad
/// PIN, the plaintext (often a JSON string) under `data` on success.
#[derive(Debug, Clone, serde::Deserialize)]
struct KeyFileDecryptResponse {
    status: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

fn key_file_part(file_name: &str, data: Vec<u8>) -> Part {
    Part::bytes(data).file_name(file_name.to_string())
}

impl ApiClient {
    /// Create an encrypted config for a single workspace. Returns the
    /// encrypted file bytes for the caller to save.
    pub async fn create_config(
        &self,
        record: &WorkspaceRecord,
        pin: &str,
    ) -> Result<Bytes, AppError> {
        record.validate()?;
        mydre_core::validation::validate_pin(pin)?;
        let body = ConfigCreateRequest::new(record, pin);
        self.post_json_for_bytes(&format!("{}/config/create", api_prefix()), &body)
            .await
    }

    /// Decrypt a `.mydre` file with its PIN. Both response shapes are
    /// accepted and returned as [`DecryptedConfig`].
    pub async fn decrypt_config(
        &self,
        file_name: &str,
        data: Vec<u8>,
        pin: &str,
    ) -> Result<DecryptedConfig, AppError> {
        let form = Form::new()
            .part("file", key_file_part(file_name, data))
            .text("pin", pin.to_string());
        self.post_multipart(&format!("{}/config/decrypt", api_prefix()), form)
            .await
    }

    /// Encrypt a combined bundle. The bundle is serialized to JSON and
    /// submitted as a file part named after the requested output filename.
    pub async fn combine_encrypt(
        &self,
        file_name: &str,
        bundle: &WorkspaceBundle,
        pin: &str,
    ) -> Result<Bytes, AppError> {
        let payload = serde_json::to_vec(bundle)?;
        let form = Form::new()
            .part(
                "file",
                key_file_part(file_name, payload).mime_str("application/json").map_err(
                    |e| AppError::Internal(format!("Invalid mime type: {}", e)),
                )?,
            )
            .text("pin", pin.to_string());
        self.post_multipart_for_bytes(&format!("{}/combine/encrypt", api_prefix()), form)
            .await
    }

    /// Upload a set of data files to one workspace.
    pub async fn upload_to_workspace(
        &self,
        record: &WorkspaceRecord,
        files: &[(String, Vec<u8>)],
    ) -> Result<StatusResponse, AppError> {
        let mut form = Form::new()
            .text("workspace_name", record.workspace_name.clone())
            .text("workspace_key", record.workspace_key.clone())
            .text("subscription_key", record.subscription_key.clone())
            .text("uploader_name", record.uploader_name.clone());
        for (name, data) in files {
            form = form.part("files", key_file_part(name, data.clone()));
        }
        self.post_multipart(&format!("{}/upload/workspace", api_prefix()), form)
            .await
    }

    /// Upload a single data file through the legacy route, optionally
    /// alongside an encrypted config blob.
    pub async fn upload_file(
        &self,
        file_name: &str,
        data: Vec<u8>,
        config: Option<Vec<u8>>,
    ) -> Result<StatusResponse, AppError> {
        let mut form = Form::new().part("file", key_file_part(file_name, data));
        if let Some(config) = config {
            form = form.part("config", key_file_part("config.mydre", config));
        }
        self.post_multipart(&format!("{}/upload", api_prefix()), form)
            .await
    }

    /// List the server-side staging area.
    pub async fn staged_files(&self) -> Result<StagedFilesResponse, AppError> {
        self.get(&format!("{}/upload2/files", api_prefix())).await
    }

    /// Add files to the staging area.
    pub async fn stage_files(
        &self,
        files: &[(String, Vec<u8>)],
    ) -> Result<StagedFilesResponse, AppError> {
        let mut form = Form::new();
        for (name, data) in files {
            form = form.part("files", key_file_part(name, data.clone()));
        }
        self.post_multipart(&format!("{}/upload2/files", api_prefix()), form)
            .await
    }

    /// Remove one file from the staging area.
    pub async fn delete_staged_file(&self, file_name: &str) -> Result<StatusResponse, AppError> {
        self.delete(&format!(
            "{}/upload2/files/{}",
            api_prefix(),
            urlencoding::encode(file_name)
        ))
        .await
    }

    /// Decrypt a key file through the staged-upload endpoint, which wraps
    /// the plaintext in a status envelope instead of using HTTP status
    /// codes for decryption failures.
    pub async fn decrypt_key_file(
        &self,
        file_name: &str,
        data: Vec<u8>,
        pin: &str,
    ) -> Result<DecryptedConfig, AppError> {
        let form = Form::new()
            .part("file", key_file_part(file_name, data))
            .text("pin", pin.to_string());
        let envelope: KeyFileDecryptResponse = self
            .post_multipart(&format!("{}/upload2/decrypt", api_prefix()), form)
            .await?;

        if envelope.status != "success" {
            return Err(AppError::Decrypt(
                envelope
                    .message
                    .unwrap_or_else(|| "Invalid PIN or corrupted file".to_string()),
            ));
        }
        match envelope.data {
            Some(serde_json::Value::String(raw)) => DecryptedConfig::from_json_str(&raw),
            Some(value) => serde_json::from_value(value).map_err(AppError::from),
            None => Err(AppError::Decrypt("Empty decryption response".to_string())),
        }
    }
}
