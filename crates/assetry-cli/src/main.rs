//! Assetry CLI: ingest and inspect assets using the environment configuration.
//!
//! Reads the same variables as a host would (STORAGE_BACKEND, ASSET_BUCKET, ASSET_DOMAIN, ...),
//! optionally from a `.env` file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use assetry_cli::{init_tracing, print_json, variant_summary};
use assetry_core::{AssetConfig, UploadedFile};
use assetry_processing::AssetAdapter;
use assetry_storage::PathResolver;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "assetry", about = "Asset storage adapter CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a file as an original and derive its size variants
    Ingest {
        /// Path to the file to ingest
        file: PathBuf,
        /// File name to allocate from (defaults to the file's own name)
        #[arg(long)]
        name: Option<String>,
        /// Content type (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
        /// Target directory hint (logged only; the dated directory is always used)
        #[arg(long)]
        dir_hint: Option<String>,
    },
    /// Store a file verbatim at the given path
    SaveRaw {
        /// Path to the file to store
        file: PathBuf,
        /// Target key, path or URL
        target: String,
    },
    /// Read an asset by URL, path or key
    Read {
        identifier: String,
        /// Write the bytes to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Delete an asset by URL, path or key
    Delete { identifier: String },
    /// Check whether a file name is taken in a directory
    Exists { filename: String, target_dir: String },
    /// Print the public URL for an identifier
    Url { identifier: String },
    /// Print the store key an identifier resolves to
    Resolve { identifier: String },
}

#[derive(Serialize)]
struct ExistsOutput {
    key: String,
    exists: bool,
}

#[derive(Serialize)]
struct ResolveOutput {
    key: String,
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = AssetConfig::from_env().context("Failed to load asset configuration")?;
    let paths = PathResolver::new(&config);

    match cli.command {
        Commands::Ingest {
            file,
            name,
            content_type,
            dir_hint,
        } => {
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .context("File path has no usable file name; pass --name")?,
            };
            let mut upload = UploadedFile::new(name, file);
            if let Some(content_type) = content_type {
                upload = upload.with_content_type(content_type);
            }

            let adapter = connect(config).await?;
            let mut outcome = adapter
                .ingest(&upload, dir_hint.as_deref())
                .await
                .context("Ingest failed")?;

            if outcome.variants.pending > 0 {
                let flushed = adapter.flush_variants().await;
                outcome.variants.pending = 0;
                outcome.variants.merge(flushed);
            }

            tracing::info!(
                key = %outcome.key,
                variants = %variant_summary(&outcome.variants),
                "Ingest complete"
            );
            print_json(&outcome)?;
        }
        Commands::SaveRaw { file, target } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let adapter = connect(config).await?;
            let url = adapter
                .save_raw(Bytes::from(data), &target)
                .await
                .context("Save failed")?;
            println!("{}", url);
        }
        Commands::Read { identifier, output } => {
            let adapter = connect(config).await?;
            let data = adapter
                .read(identifier.as_str())
                .await
                .with_context(|| format!("Failed to read {}", identifier))?;
            match output {
                Some(path) => tokio::fs::write(&path, &data)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => std::io::stdout()
                    .write_all(&data)
                    .context("Failed to write to stdout")?,
            }
        }
        Commands::Delete { identifier } => {
            let adapter = connect(config).await?;
            adapter
                .delete(identifier.as_str())
                .await
                .with_context(|| format!("Failed to delete {}", identifier))?;
            println!("Deleted {}", identifier);
        }
        Commands::Exists {
            filename,
            target_dir,
        } => {
            let adapter = connect(config).await?;
            let key = paths.resolve_in(&target_dir, &filename)?;
            let exists = adapter
                .exists(&filename, &target_dir)
                .await
                .context("Existence check failed")?;
            print_json(&ExistsOutput { key, exists })?;
        }
        Commands::Url { identifier } => {
            let key = paths.resolve(&identifier).context("Invalid identifier")?;
            println!("{}", paths.public_url(&key));
        }
        Commands::Resolve { identifier } => {
            let key = paths.resolve(&identifier).context("Invalid identifier")?;
            let url = paths.public_url(&key);
            print_json(&ResolveOutput { key, url })?;
        }
    }

    Ok(())
}

/// Storage is only opened for commands that touch objects.
async fn connect(config: AssetConfig) -> anyhow::Result<AssetAdapter> {
    AssetAdapter::from_config(config)
        .await
        .context("Failed to initialize storage")
}
