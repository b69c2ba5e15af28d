use std::path::PathBuf;

use thiserror::Error;

/// Distinguishes a collaborator that could not be reached from one that
/// refused the input it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorKind {
    Unavailable,
    Rejected,
}

impl std::fmt::Display for CollaboratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => f.write_str("unavailable"),
            Self::Rejected => f.write_str("rejected input"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("No documents found under {}", .0.display())]
    NoDocumentsFound(PathBuf),

    #[error("Failed to load index: {0}")]
    IndexLoad(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Collaborator {kind}: {message}")]
    Collaborator { kind: CollaboratorKind, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Collaborator { kind: CollaboratorKind::Unavailable, message: message.into() }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Collaborator { kind: CollaboratorKind::Rejected, message: message.into() }
    }

    /// Fatal conditions are the ones a caller cannot degrade around:
    /// broken artifacts and unreachable collaborators.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::IndexLoad(_)
                | Self::NoDocumentsFound(_)
                | Self::Collaborator { kind: CollaboratorKind::Unavailable, .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
