// src/error.rs

use std::path::PathBuf;

/// Errors that abort an analysis run.
///
/// Files that are excluded from the report (no history, several authors)
/// are not errors; see [`crate::model::Exclusion`].
#[derive(Debug, thiserror::Error)]
pub enum CriticError {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("{} is not inside a git working tree", .path.display())]
    NotARepository { path: PathBuf },

    /// The recency lookup found nothing for an author taken from the report.
    #[error("no commit found for author '{author}'")]
    NoCommitFound { author: String },

    #[error("failed to write report {}: {source}", .path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read report {}: {source}", .path.display())]
    ReadReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed report line {line}: {reason}")]
    MalformedReport { line: usize, reason: String },

    #[error("failed to write chart {}: {source}", .path.display())]
    WriteChart {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("file walk failed: {0}")]
    Walk(#[from] ignore::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CriticError>;
