//! Command-line interface
//!
//! `serve` runs the HTTP API; the other subcommands call the same
//! `FileStore` operations directly, which is handy for checking bucket
//! credentials or fixing up objects without the UI.

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::storage::{FileStore, HttpMethod, UploadedFile};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the HTTP API and serve the front-end build (default)
    Serve {
        /// Override HOST
        #[arg(long)]
        host: Option<String>,
        /// Override PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Check that the bucket is reachable with the configured credentials
    Test,
    /// List files, across all categories unless a directory is given
    List {
        #[arg(short, long)]
        directory: Option<String>,
        #[arg(short, long)]
        max_keys: Option<usize>,
    },
    /// Print a signed URL for an object
    Sign {
        key: String,
        #[arg(short, long, default_value = "get")]
        operation: HttpMethod,
        #[arg(short, long)]
        expires: Option<u32>,
    },
    /// Upload a local file
    Upload {
        path: PathBuf,
        #[arg(short, long)]
        directory: Option<String>,
    },
    /// Delete an object
    Delete { key: String },
}

/// Run a one-shot storage subcommand, printing JSON results to stdout
pub async fn run_command(store: &FileStore, command: Command) -> Result<()> {
    match command {
        Command::Serve { .. } => {
            anyhow::bail!("serve is handled by the server entry point")
        }
        Command::Test => {
            let connected = store.test_connection().await?;
            println!("{}", serde_json::json!({ "connected": connected }));
        }
        Command::List { directory, max_keys } => {
            let entries = store.list_files(directory.as_deref(), max_keys).await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Sign { key, operation, expires } => {
            let url = store.get_signed_url(&key, operation, expires).await?;
            println!("{}", url);
        }
        Command::Upload { path, directory } => {
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .context("Upload path has no file name")?;
            let result = store
                .upload_file(
                    UploadedFile {
                        name,
                        content_type: None,
                        data: Bytes::from(data),
                    },
                    directory.as_deref(),
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Delete { key } => {
            let deleted = store.delete_file(&key).await?;
            println!("{}", serde_json::json!({ "deleted": deleted, "object_key": key }));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryGateway;
    use std::sync::Arc;

    #[test]
    fn test_parse_sign() {
        let args = Args::parse_from(["vqa-storage", "sign", "note/a.png", "--operation", "put", "--expires", "60"]);
        assert_eq!(
            args.command,
            Some(Command::Sign {
                key: "note/a.png".to_string(),
                operation: HttpMethod::Put,
                expires: Some(60),
            })
        );
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let args = Args::parse_from(["vqa-storage"]);
        assert!(args.command.is_none());
    }

    #[tokio::test]
    async fn test_delete_command_propagates_not_found() {
        let store = FileStore::new(Arc::new(MemoryGateway::new("http://bucket.test")));
        let result = run_command(&store, Command::Delete { key: "paper/none.pdf".to_string() }).await;
        assert!(result.is_err());
    }
}
