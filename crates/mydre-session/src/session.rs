//! The session facade: one struct driving the whole intake, decrypt,
//! combine and upload flow against an injected [`ConfigGateway`].

use mydre_core::validation::{config_filename, validate_pin, PLAINTEXT_PIN};
use mydre_core::{AppError, DecryptedConfig, FileStatus, WorkspaceRecord};
use uuid::Uuid;

use crate::collection::WorkspaceCollection;
use crate::composer::{prepare_combine, EncryptedArtifact};
use crate::gateway::ConfigGateway;
use crate::intake::{FileIntake, IntakeOutcome, IntakePolicy};
use crate::prompt::PinPrompt;
use crate::uploader::{self, UploadReport};

pub struct ConfigSession<G: ConfigGateway> {
    gateway: G,
    intake: FileIntake,
    prompt: PinPrompt,
    collection: WorkspaceCollection,
}

impl<G: ConfigGateway> ConfigSession<G> {
    pub fn new(gateway: G, policy: IntakePolicy) -> Self {
        Self {
            gateway,
            intake: FileIntake::new(policy),
            prompt: PinPrompt::new(),
            collection: WorkspaceCollection::new(),
        }
    }

    /// Add candidate key files to the intake.
    pub fn add_files(
        &mut self,
        candidates: Vec<(String, Vec<u8>)>,
    ) -> Result<IntakeOutcome, AppError> {
        self.intake.add_files(candidates)
    }

    /// Open the PIN prompt for a file. Files already decrypted
    /// successfully are not offered again; failed ones are.
    pub fn open_prompt(&mut self, file_name: &str) -> Result<(), AppError> {
        let file = self
            .intake
            .get(file_name)
            .ok_or_else(|| AppError::NotFound(format!("File not in intake: {}", file_name)))?;
        if !file.status.accepts_decrypt() {
            return Err(AppError::InvalidInput(format!(
                "File already decrypted: {}",
                file_name
            )));
        }
        self.prompt.open(file_name)
    }

    pub fn cancel_prompt(&mut self) -> Option<String> {
        self.prompt.cancel()
    }

    /// Confirm the open prompt with a PIN and run the decrypt.
    pub async fn confirm_pin(&mut self, pin: &str) -> Result<Vec<Uuid>, AppError> {
        let (file_name, pin) = self.prompt.confirm(pin)?;
        self.decrypt_file(&file_name, &pin).await
    }

    /// Decrypt one intake file and merge its workspaces. The PIN is
    /// validated locally before any request goes out; a too-short PIN
    /// leaves the file untouched. On a decryption failure the file is
    /// marked errored and stays available for another attempt. A
    /// re-decrypt of a file replaces its earlier contribution.
    pub async fn decrypt_file(
        &mut self,
        file_name: &str,
        pin: &str,
    ) -> Result<Vec<Uuid>, AppError> {
        validate_pin(pin)?;
        let file = self
            .intake
            .get(file_name)
            .ok_or_else(|| AppError::NotFound(format!("File not in intake: {}", file_name)))?;
        let data = file.data.clone();

        let result = if pin == PLAINTEXT_PIN {
            parse_plaintext(&data)
        } else {
            self.gateway.decrypt(file_name, data, pin).await
        };

        match result {
            Ok(config) => {
                let added = self.collection.merge(file_name, config.into_bundle());
                self.intake.set_status(file_name, FileStatus::Success)?;
                tracing::info!(file = %file_name, workspaces = added.len(), "Decrypted key file");
                Ok(added)
            }
            Err(err) => {
                self.intake.set_status(file_name, FileStatus::Error)?;
                tracing::warn!(file = %file_name, error = %err, "Decryption failed");
                Err(err)
            }
        }
    }

    /// Drop a file from the intake together with the workspaces it
    /// contributed.
    pub fn remove_file(&mut self, file_name: &str) -> Result<usize, AppError> {
        self.intake
            .remove(file_name)
            .ok_or_else(|| AppError::NotFound(format!("File not in intake: {}", file_name)))?;
        if self.prompt.target() == Some(file_name) {
            self.prompt.cancel();
        }
        Ok(self.collection.remove_from_file(file_name))
    }

    /// Remove one workspace row. When it was the last row from its source
    /// file, that file reverts to pending so it can be decrypted again.
    pub fn remove_workspace(&mut self, id: Uuid) -> Result<(), AppError> {
        let (removed, source_emptied) = self
            .collection
            .remove_entry(id)
            .ok_or_else(|| AppError::NotFound(format!("Unknown workspace entry: {}", id)))?;
        if source_emptied && self.intake.get(&removed.source_file).is_some() {
            self.intake
                .set_status(&removed.source_file, FileStatus::Pending)?;
        }
        Ok(())
    }

    /// Combine all collected workspaces into one encrypted file.
    pub async fn combine(
        &self,
        pin: &str,
        filename: &str,
    ) -> Result<EncryptedArtifact, AppError> {
        let payload = prepare_combine(&self.collection, pin, filename)?;
        let data = self
            .gateway
            .encrypt_bundle(&payload.filename, &payload.bundle, pin)
            .await?;
        Ok(EncryptedArtifact {
            filename: payload.filename,
            data,
        })
    }

    /// Create a fresh single-workspace config file.
    pub async fn create(
        &self,
        record: &WorkspaceRecord,
        pin: &str,
    ) -> Result<EncryptedArtifact, AppError> {
        record.validate()?;
        validate_pin(pin)?;
        let data = self.gateway.create_config(record, pin).await?;
        Ok(EncryptedArtifact {
            filename: config_filename(&record.workspace_name, &record.uploader_name),
            data,
        })
    }

    /// Upload data files to every collected workspace, bounded by
    /// `concurrency`, and record the per-row outcome.
    pub async fn upload_files(
        &mut self,
        files: &[(String, Vec<u8>)],
        concurrency: usize,
    ) -> Result<UploadReport, AppError> {
        let report = uploader::upload_to_workspaces(
            &self.gateway,
            self.collection.entries(),
            files,
            concurrency,
        )
        .await?;
        for outcome in &report.outcomes {
            let status = if outcome.result.is_ok() {
                FileStatus::Success
            } else {
                FileStatus::Error
            };
            self.collection.set_upload_status(outcome.entry_id, status);
        }
        Ok(report)
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    pub fn collection(&self) -> &WorkspaceCollection {
        &self.collection
    }

    pub fn prompt(&self) -> &PinPrompt {
        &self.prompt
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

fn parse_plaintext(data: &[u8]) -> Result<DecryptedConfig, AppError> {
    let text = std::str::from_utf8(data)
        .map_err(|_| AppError::Decrypt("File is not valid UTF-8 JSON".to_string()))?;
    DecryptedConfig::from_json_str(text)
        .map_err(|err| AppError::Decrypt(format!("Plaintext parse failed: {}", err)))
}
