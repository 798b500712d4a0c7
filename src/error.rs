//! Error types shared by the mapping parser, the remapper and the batch runner.
//!
//! Every filesystem variant carries the path it failed on so a failed run
//! points straight at the offending file or directory.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = RepackageError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RepackageError {
    /// A mapping record has no usable destination field.
    #[error("malformed mapping line {line_number}: {reason}: {line:?}")]
    MalformedMappingLine {
        line_number: usize,
        line: String,
        reason: &'static str,
    },

    #[error("failed to fetch class mappings from {source_desc}: {message}")]
    MappingFetchFailed {
        source_desc: String,
        message: String,
    },

    #[error("could not list patch files in {}", path.display())]
    DirectoryListingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not create output directory {}", path.display())]
    OutputDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}", path.display())]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl RepackageError {
    /// The file or directory this error is about, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::DirectoryListingFailed { path, .. }
            | Self::OutputDirectoryFailed { path, .. }
            | Self::FileReadFailed { path, .. }
            | Self::FileWriteFailed { path, .. } => Some(path),
            _ => None,
        }
    }
}
