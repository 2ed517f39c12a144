//! Session state for the myDRE configuration pipeline.
//!
//! One [`ConfigSession`] instance owns the whole intake → PIN prompt →
//! decrypt → collect → combine flow for a page/terminal session. Every
//! component is an explicit struct constructed with its dependencies;
//! the backend sits behind the [`ConfigGateway`] trait so the flow is
//! testable without a server.

pub mod collection;
pub mod composer;
pub mod gateway;
pub mod intake;
pub mod prompt;
pub mod session;
pub mod staging;
pub mod uploader;

pub use collection::{WorkspaceCollection, WorkspaceEntry};
pub use composer::{prepare_combine, EncryptedArtifact};
pub use gateway::ConfigGateway;
pub use intake::{FileIntake, IntakeOutcome, IntakePolicy};
pub use prompt::PinPrompt;
pub use session::ConfigSession;
pub use staging::StagedFileManager;
pub use uploader::{UploadReport, WorkspaceUploadOutcome, DEFAULT_UPLOAD_CONCURRENCY};
