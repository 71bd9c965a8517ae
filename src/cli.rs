use crate::config::load_storage_config;
use crate::error::{LocalAlreadyExistsSnafu, LocalNotFoundSnafu, Result};
use crate::storage::utils::path::{basename, build_remote_path};
use crate::storage::{Client, ClientFactory};
use crate::wrap_err;
use clap::{Parser, Subcommand};
use snafu::{OptionExt, ensure};
use std::path::{Path, PathBuf};

/// Command-line interface for stowage
#[derive(Parser, Debug)]
#[command(
    name = "stowage",
    version,
    about = "Manage files on object stores, file shares and sync services"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the storage backends this build supports
    Avail,
    /// List a remote directory
    Ls {
        /// Directory to list (defaults to the root)
        #[arg(default_value = "/")]
        path: String,
        /// Draw the whole subtree
        #[arg(short, long)]
        tree: bool,
    },
    /// Upload a local file or directory
    Push {
        /// Local file or directory
        source: PathBuf,
        /// Remote directory to upload into (defaults to the root)
        dest_dir: Option<String>,
        /// Upload directories and their contents
        #[arg(short, long)]
        recursive: bool,
    },
    /// Download a remote file or directory
    Pull {
        /// Remote file or directory
        source: String,
        /// Local directory to download into (defaults to the current directory)
        dest_dir: Option<PathBuf>,
        /// Download directories and their contents
        #[arg(short, long)]
        recursive: bool,
    },
    /// Delete a remote file
    Rm { path: String },
    /// Create a remote directory
    Mkdir {
        path: String,
        /// Create missing parent directories
        #[arg(short = 'p', long)]
        parents: bool,
    },
    /// Remove a remote directory
    Rmdir {
        path: String,
        /// Remove the directory together with everything in it
        #[arg(short, long)]
        recursive: bool,
    },
    /// Show the total size of a remote file or directory
    Size { path: String },
}

/// Run a parsed command line, loading configuration from the environment
/// for every command that talks to a backend.
pub async fn run(args: Args) -> Result<()> {
    if args.command == Command::Avail {
        for registration in ClientFactory::available() {
            println!("{:<10} {}", registration.id, registration.friendly_name);
        }
        return Ok(());
    }

    let config = load_storage_config()?;
    let mut client = ClientFactory::for_backend(config.backend.id(), &config.credentials)?;
    execute(&mut client, args.command).await
}

/// Run one command against an already constructed client.
pub async fn execute(client: &mut impl Client, command: Command) -> Result<()> {
    match command {
        Command::Avail => {}
        Command::Ls { path, tree } => {
            println!("{}", client.list(&path, tree).await?);
        }
        Command::Push {
            source,
            dest_dir,
            recursive,
        } => {
            let name = local_basename(&source)?;
            let dest = build_remote_path(dest_dir.as_deref().unwrap_or_default(), &name);
            let remote = wrap_err!(
                client.push(&source, &dest, recursive).await,
                UploadFailed {
                    local_path: source.display().to_string(),
                    remote_path: dest.clone()
                }
            )?;
            println!("Uploaded {} to {remote}", source.display());
        }
        Command::Pull {
            source,
            dest_dir,
            recursive,
        } => {
            let name = match basename(&source) {
                name if name.is_empty() => client.backend().id().to_string(),
                name => name,
            };
            let dest = dest_dir.unwrap_or_else(|| PathBuf::from(".")).join(name);
            ensure!(!dest.exists(), LocalAlreadyExistsSnafu { path: dest.clone() });

            println!("Pulling {source} ({})", client.filesize(&source).await?);
            let local = wrap_err!(
                client.pull(&source, &dest, recursive).await,
                DownloadFailed {
                    remote_path: source.clone(),
                    local_path: dest.display().to_string()
                }
            )?;
            println!("Downloaded {source} to {}", local.display());
        }
        Command::Rm { path } => {
            println!("Deleted {}", client.delete(&path).await?);
        }
        Command::Mkdir { path, parents } => {
            println!("Created directory {}", client.mkdir(&path, parents).await?);
        }
        Command::Rmdir { path, recursive } => {
            println!("Removed directory {}", client.rmdir(&path, recursive).await?);
        }
        Command::Size { path } => {
            println!("{}\t{path}", client.filesize(&path).await?);
        }
    }
    Ok(())
}

/// Final component of a local path, resolving "." and ".." first.
fn local_basename(path: &Path) -> Result<String> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_string_lossy().to_string());
    }
    let resolved = std::fs::canonicalize(path).ok();
    resolved
        .as_deref()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_string())
        .context(LocalNotFoundSnafu {
            path: path.to_path_buf(),
        })
}
