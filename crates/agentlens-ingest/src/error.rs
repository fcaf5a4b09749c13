use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a tool from being loaded at all. Individual files
/// that fail to decode are not errors; they load as empty input.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("export directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("export path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
