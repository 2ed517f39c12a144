//! The backend seam.
//!
//! All cryptographic work happens server-side; the session only ever
//! talks to it through this trait, so tests run against an in-memory
//! stub and the CLI runs against [`ApiClient`].

use async_trait::async_trait;
use bytes::Bytes;
use mydre_api_client::api::StatusResponse;
use mydre_api_client::ApiClient;
use mydre_core::{AppError, DecryptedConfig, WorkspaceBundle, WorkspaceRecord};

#[async_trait]
pub trait ConfigGateway: Send + Sync {
    /// Decrypt a `.mydre` file with its PIN.
    async fn decrypt(
        &self,
        file_name: &str,
        data: Vec<u8>,
        pin: &str,
    ) -> Result<DecryptedConfig, AppError>;

    /// Encrypt a workspace bundle under a new PIN.
    async fn encrypt_bundle(
        &self,
        file_name: &str,
        bundle: &WorkspaceBundle,
        pin: &str,
    ) -> Result<Bytes, AppError>;

    /// Create an encrypted single-workspace config.
    async fn create_config(
        &self,
        record: &WorkspaceRecord,
        pin: &str,
    ) -> Result<Bytes, AppError>;

    /// Upload data files to one workspace.
    async fn upload_workspace(
        &self,
        record: &WorkspaceRecord,
        files: &[(String, Vec<u8>)],
    ) -> Result<StatusResponse, AppError>;
}

#[async_trait]
impl ConfigGateway for ApiClient {
    async fn decrypt(
        &self,
        file_name: &str,
        data: Vec<u8>,
        pin: &str,
    ) -> Result<DecryptedConfig, AppError> {
        self.decrypt_config(file_name, data, pin).await
    }

    async fn encrypt_bundle(
        &self,
        file_name: &str,
        bundle: &WorkspaceBundle,
        pin: &str,
    ) -> Result<Bytes, AppError> {
        self.combine_encrypt(file_name, bundle, pin).await
    }

    async fn create_config(
        &self,
        record: &WorkspaceRecord,
        pin: &str,
    ) -> Result<Bytes, AppError> {
        ApiClient::create_config(self, record, pin).await
    }

    async fn upload_workspace(
        &self,
        record: &WorkspaceRecord,
        files: &[(String, Vec<u8>)],
    ) -> Result<StatusResponse, AppError> {
        self.upload_to_workspace(record, files).await
    }
}
