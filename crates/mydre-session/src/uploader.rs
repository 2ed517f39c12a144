//! Bounded-concurrency upload of data files to workspace rows.
//!
//! The original page fired one request per workspace without awaiting or
//! aggregating. Here the requests run through a capped stream and every
//! row's result lands in one [`UploadReport`]; a failing row never aborts
//! the others.

use futures::stream::{self, StreamExt};
use mydre_core::AppError;
use uuid::Uuid;

use crate::collection::WorkspaceEntry;
use crate::gateway::ConfigGateway;

pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;

/// Result of the upload to one workspace row.
#[derive(Debug)]
pub struct WorkspaceUploadOutcome {
    pub entry_id: Uuid,
    pub workspace_name: String,
    pub result: Result<(), AppError>,
}

/// Aggregate outcome of one upload action.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub outcomes: Vec<WorkspaceUploadOutcome>,
}

impl UploadReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Upload `files` to every workspace entry, at most `limit` requests in
/// flight. Outcomes are collected for every row; order follows completion,
/// not submission.
pub async fn upload_to_workspaces<G: ConfigGateway>(
    gateway: &G,
    entries: &[WorkspaceEntry],
    files: &[(String, Vec<u8>)],
    limit: usize,
) -> Result<UploadReport, AppError> {
    if files.is_empty() {
        return Err(AppError::InvalidInput(
            "No files to upload".to_string(),
        ));
    }
    if entries.is_empty() {
        return Err(AppError::InvalidInput(
            "No workspaces available for upload".to_string(),
        ));
    }

    let limit = limit.max(1);
    let outcomes = stream::iter(entries.iter().map(|entry| {
        let record = entry.to_record();
        async move {
            let result = gateway
                .upload_workspace(&record, files)
                .await
                .and_then(|response| {
                    if response.is_success() {
                        Ok(())
                    } else {
                        // Rejected with HTTP 200; only the envelope says so.
                        Err(AppError::UploadRejected(
                            response
                                .message
                                .unwrap_or_else(|| "no detail provided".to_string()),
                        ))
                    }
                });
            if let Err(err) = &result {
                tracing::error!(workspace = %entry.name, error = %err, "Upload failed");
            }
            WorkspaceUploadOutcome {
                entry_id: entry.id,
                workspace_name: entry.name.clone(),
                result,
            }
        }
    }))
    .buffer_unordered(limit)
    .collect::<Vec<_>>()
    .await;

    Ok(UploadReport { outcomes })
}
