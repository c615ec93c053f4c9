//! Error types for the dotmeta workspace.
//!
//! This module provides [`MetadataError`], the single taxonomy through which
//! classification, path handling, and every metadata reader report failure.
//!
//! # Propagation
//!
//! Every variant is terminal: nothing in the workspace retries or degrades on
//! error. The CLI renders whichever error reaches it as a JSON envelope and
//! exits non-zero. The only built-in retry (the relaxed manifest parse) happens
//! before an error is ever constructed.

use camino::Utf8PathBuf;

/// Errors that can occur while classifying or reading an artifact.
///
/// # Examples
///
/// ```
/// use dm_core::MetadataError;
///
/// let error = MetadataError::UnknownDescriptor("Gemfile".to_owned());
/// assert!(error.to_string().contains("Gemfile"));
/// assert_eq!(error.kind(), "UnknownDescriptor");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The input path is empty or cannot be resolved to an absolute path.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The path as it was given.
        path: String,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// A descriptor name given on the command line is not a known artifact kind.
    #[error("unknown descriptor: {0}")]
    UnknownDescriptor(String),

    /// No descriptor accepted the path.
    #[error("no metadata provider found for file {0}")]
    NoMatchingDescriptor(Utf8PathBuf),

    /// A reader could not load its artifact.
    #[error("failed to read {path}: {reason}")]
    Read {
        /// The artifact being read.
        path: Utf8PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The solution file is not a recognizable solution document.
    #[error("failed to parse solution {path}: {reason}")]
    SolutionParse {
        /// The solution file.
        path: Utf8PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A project referenced by a solution could not be opened or parsed.
    #[error("failed to read project {path}: {reason}")]
    ProjectRead {
        /// The resolved project path.
        path: Utf8PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A reference declaration inside a project is malformed.
    #[error("invalid reference in project {path}: {reason}")]
    ReferenceParse {
        /// The project containing the reference.
        path: Utf8PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The loaded metadata could not be rendered as JSON.
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl MetadataError {
    /// Creates a new [`MetadataError::InvalidPath`] error.
    #[inline]
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new [`MetadataError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new [`MetadataError::SolutionParse`] error.
    #[inline]
    pub fn solution_parse(path: impl Into<Utf8PathBuf>, reason: impl ToString) -> Self {
        Self::SolutionParse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new [`MetadataError::ProjectRead`] error.
    #[inline]
    pub fn project_read(path: impl Into<Utf8PathBuf>, reason: impl ToString) -> Self {
        Self::ProjectRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new [`MetadataError::ReferenceParse`] error.
    #[inline]
    pub fn reference_parse(path: impl Into<Utf8PathBuf>, reason: impl ToString) -> Self {
        Self::ReferenceParse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the taxonomy name of this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "InvalidPath",
            Self::UnknownDescriptor(_) => "UnknownDescriptor",
            Self::NoMatchingDescriptor(_) => "NoMatchingDescriptor",
            Self::Read { .. } | Self::Serialize(_) => "ReadError",
            Self::SolutionParse { .. } => "SolutionParseError",
            Self::ProjectRead { .. } => "ProjectReadError",
            Self::ReferenceParse { .. } => "ReferenceParseError",
        }
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::NoMatchingDescriptor(path)
            | Self::Read { path, .. }
            | Self::SolutionParse { path, .. }
            | Self::ProjectRead { path, .. }
            | Self::ReferenceParse { path, .. } => Some(path),
            Self::InvalidPath { .. } | Self::UnknownDescriptor(_) | Self::Serialize(_) => None,
        }
    }
}
