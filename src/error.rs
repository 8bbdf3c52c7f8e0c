use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the palette engine and its CLI.
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Failed to read config from {path}: {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    #[error("Failed to read recent actions from {path}: {source}")]
    RecentRead { path: PathBuf, source: io::Error },

    #[error("Failed to write recent actions to {path}: {source}")]
    RecentWrite { path: PathBuf, source: io::Error },

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Data directory not found")]
    NoDataDir,

    #[error("Failed to start async runtime: {0}")]
    Runtime(io::Error),

    #[error("Action {0} failed")]
    ExecutionFailed(String),

    #[error("No result at index {0}")]
    NoSuchResult(usize),

    #[error("Provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to read stdin: {0}")]
    StdinRead(#[from] io::Error),
}

/// Failures of the external collaborators (port scanner, process manager,
/// clipboard, shell, network lookups).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Folder {0} is not available on this platform")]
    FolderUnavailable(&'static str),

    #[error("No tool registered as {0:?}")]
    UnknownTool(String),

    #[error("No process found on port {0}")]
    PortNotFound(u16),

    #[error("Failed to terminate PID {0}")]
    KillFailed(u32),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Other(String),
}
