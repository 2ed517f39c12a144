//! myDRE CLI — create, decrypt, combine and upload `.mydre` workspace
//! configuration files.
//!
//! Set MYDRE_API_URL (or API_URL) to point at the configuration API.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mydre_api_client::ApiClient;
use mydre_cli::{init_tracing, mask_key};
use mydre_core::WorkspaceRecord;
use mydre_session::{
    ConfigSession, EncryptedArtifact, IntakePolicy, StagedFileManager, WorkspaceCollection,
    DEFAULT_UPLOAD_CONCURRENCY,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "mydre", about = "myDRE workspace configuration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an encrypted workspace config file
    Create {
        /// Workspace name
        #[arg(long)]
        workspace_name: String,
        /// Workspace key
        #[arg(long)]
        workspace_key: String,
        /// Subscription key
        #[arg(long)]
        subscription_key: String,
        /// Uploader name or email
        #[arg(long)]
        uploader_name: String,
        /// Encryption PIN (at least 6 characters)
        #[arg(long)]
        pin: String,
        /// Directory to write the .mydre file into
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
    /// Decrypt key files and list their workspaces
    Decrypt {
        /// Key files to decrypt
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// PIN; repeat to give one per file, in order
        #[arg(long = "pin", required = true)]
        pins: Vec<String>,
    },
    /// Combine key files into one encrypted bundle
    Combine {
        /// Key files to combine
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// PIN; repeat to give one per file, in order
        #[arg(long = "pin", required = true)]
        pins: Vec<String>,
        /// PIN for the combined output file
        #[arg(long)]
        out_pin: String,
        /// Output filename (defaults to combined_configs.mydre)
        #[arg(long, default_value = "")]
        output: String,
    },
    /// Upload data files to every workspace in a key file
    Upload {
        /// Encrypted key file
        #[arg(long)]
        key_file: PathBuf,
        /// PIN for the key file
        #[arg(long)]
        pin: String,
        /// Data files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Maximum requests in flight
        #[arg(long, default_value_t = DEFAULT_UPLOAD_CONCURRENCY)]
        concurrency: usize,
    },
    /// Server-side staged files
    Files {
        #[command(subcommand)]
        sub: FileCommands,
    },
}

#[derive(Subcommand)]
enum FileCommands {
    /// List staged files with their selection state
    List,
    /// Stage local files on the server
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete a staged file by name
    Delete {
        /// Staged filename
        name: String,
    },
    /// Decrypt a key file through the staged-upload endpoint
    Decrypt {
        /// Encrypted key file
        key_file: PathBuf,
        /// PIN for the key file
        #[arg(long)]
        pin: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn read_named(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let data = std::fs::read(path).with_context(|| format!("Read {}", path.display()))?;
    Ok((name, data))
}

fn read_all(paths: &[PathBuf]) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    paths.iter().map(|p| read_named(p)).collect()
}

/// Pair each file with its PIN: one PIN covers all files, otherwise the
/// counts must match.
fn pin_for<'a>(pins: &'a [String], index: usize, total: usize) -> anyhow::Result<&'a str> {
    if pins.len() == 1 {
        Ok(&pins[0])
    } else if pins.len() == total {
        Ok(&pins[index])
    } else {
        bail!(
            "Give one --pin for all files or one per file ({} pins for {} files)",
            pins.len(),
            total
        );
    }
}

fn write_artifact(dir: &Path, artifact: &EncryptedArtifact) -> anyhow::Result<PathBuf> {
    let path = dir.join(&artifact.filename);
    std::fs::write(&path, &artifact.data).with_context(|| format!("Write {}", path.display()))?;
    Ok(path)
}

/// Decrypt the given files into the session, one gateway call per file.
async fn decrypt_into(
    session: &mut ConfigSession<ApiClient>,
    files: Vec<(String, Vec<u8>)>,
    pins: &[String],
) -> anyhow::Result<()> {
    let total = files.len();
    let names: Vec<String> = files.iter().map(|(name, _)| name.clone()).collect();
    session.add_files(files)?;
    for (index, name) in names.iter().enumerate() {
        let pin = pin_for(pins, index, total)?;
        session
            .decrypt_file(name, pin)
            .await
            .with_context(|| format!("Decrypt {}", name))?;
    }
    Ok(())
}

fn collection_rows(collection: &WorkspaceCollection) -> Vec<serde_json::Value> {
    collection
        .entries()
        .iter()
        .map(|entry| {
            serde_json::json!({
                "workspace_name": entry.name,
                "workspace_key": mask_key(&entry.credentials.workspace_key),
                "subscription_key": mask_key(&entry.credentials.subscription_key),
                "uploader_name": entry.credentials.uploader_name,
                "source_file": entry.source_file,
                "duplicate": collection.is_duplicate(entry.id),
            })
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let client = ApiClient::from_env().context("Failed to create API client")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Create {
            workspace_name,
            workspace_key,
            subscription_key,
            uploader_name,
            pin,
            output,
        } => {
            let session = ConfigSession::new(client, IntakePolicy::Reject);
            let record = WorkspaceRecord {
                workspace_name,
                workspace_key,
                subscription_key,
                uploader_name,
            };
            let artifact = session.create(&record, &pin).await?;
            let path = write_artifact(&output, &artifact)?;
            print_json(&serde_json::json!({
                "status": "success",
                "file": path.display().to_string(),
            }))?;
        }
        Commands::Decrypt { files, pins } => {
            let mut session = ConfigSession::new(client, IntakePolicy::Reject);
            decrypt_into(&mut session, read_all(&files)?, &pins).await?;
            print_json(&serde_json::json!({
                "workspaces": collection_rows(session.collection()),
                "duplicates": session.collection().duplicate_names(),
            }))?;
        }
        Commands::Combine {
            files,
            pins,
            out_pin,
            output,
        } => {
            let mut session = ConfigSession::new(client, IntakePolicy::Reject);
            decrypt_into(&mut session, read_all(&files)?, &pins).await?;
            let artifact = session.combine(&out_pin, &output).await?;
            let path = write_artifact(Path::new("."), &artifact)?;
            print_json(&serde_json::json!({
                "status": "success",
                "file": path.display().to_string(),
                "workspaces": session.collection().len(),
            }))?;
        }
        Commands::Upload {
            key_file,
            pin,
            files,
            concurrency,
        } => {
            let mut session = ConfigSession::new(client, IntakePolicy::Reject);
            let key = read_named(&key_file)?;
            session.add_files(vec![key.clone()])?;
            session
                .decrypt_file(&key.0, &pin)
                .await
                .with_context(|| format!("Decrypt {}", key.0))?;

            let data_files = read_all(&files)?;
            let report = session.upload_files(&data_files, concurrency).await?;

            let rows: Vec<serde_json::Value> = report
                .outcomes
                .iter()
                .map(|outcome| {
                    serde_json::json!({
                        "workspace": outcome.workspace_name,
                        "status": if outcome.result.is_ok() { "success" } else { "error" },
                        "detail": outcome.result.as_ref().err().map(|e| e.to_string()),
                    })
                })
                .collect();
            print_json(&serde_json::json!({
                "uploaded": report.succeeded(),
                "failed": report.failed(),
                "workspaces": rows,
            }))?;
            if !report.all_succeeded() {
                bail!("{} of {} uploads failed", report.failed(), report.outcomes.len());
            }
        }
        Commands::Files { sub } => match sub {
            FileCommands::List => {
                let mut staged = StagedFileManager::new();
                staged.absorb(&client.staged_files().await?);
                let rows: Vec<serde_json::Value> = staged
                    .selected_files()
                    .into_iter()
                    .map(|(filename, path)| {
                        serde_json::json!({
                            "filename": filename,
                            "path": path,
                            "selected": true,
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({ "files": rows }))?;
            }
            FileCommands::Add { files } => {
                let mut staged = StagedFileManager::new();
                staged.absorb(&client.stage_files(&read_all(&files)?).await?);
                print_json(&serde_json::json!({
                    "status": "success",
                    "staged": staged.len(),
                }))?;
            }
            FileCommands::Delete { name } => {
                let response = client.delete_staged_file(&name).await?;
                print_json(&response)?;
            }
            FileCommands::Decrypt { key_file, pin } => {
                let (name, data) = read_named(&key_file)?;
                let bundle = client.decrypt_key_file(&name, data, &pin).await?.into_bundle();
                let rows: Vec<serde_json::Value> = bundle
                    .workspaces
                    .iter()
                    .map(|(workspace, creds)| {
                        serde_json::json!({
                            "workspace_name": workspace,
                            "workspace_key": mask_key(&creds.workspace_key),
                            "subscription_key": mask_key(&creds.subscription_key),
                            "uploader_name": creds.uploader_name,
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({ "workspaces": rows }))?;
            }
        },
    }

    Ok(())
}
