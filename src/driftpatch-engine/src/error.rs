//! Error types for edit operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for edit operations.
pub type EditResult<T> = Result<T, EditError>;

/// Errors that can occur while locating and applying an edit.
///
/// Every matching failure carries the requested text and, where one exists,
/// the text actually found at the nearest relevant line, so the caller can
/// correct the instruction.
#[derive(Debug, Error)]
pub enum EditError {
    /// Target file does not exist.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read the target file.
    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the target file.
    #[error("Failed to write file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to capture or restore the backup slot.
    #[error("Backup failed for {path}: {source}")]
    BackupError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target matched more than once; refusing to pick an occurrence.
    #[error("target matched {occurrences} times in {path}; refusing to pick one")]
    AmbiguousMatch { path: PathBuf, occurrences: usize },

    /// No document line inside the scan window equals the pattern's first line.
    #[error(
        "first line not found near LN-{hint} (-{backward}/+{forward} lines); requested '{expected}'"
    )]
    AnchorNotFound {
        hint: usize,
        backward: usize,
        forward: usize,
        expected: String,
    },

    /// The pattern runs past the end of the document.
    #[error(
        "pattern of {pattern_lines} lines anchored at LN-{anchor} runs past the end of the {document_lines}-line document"
    )]
    PatternExceedsDocument {
        anchor: usize,
        pattern_lines: usize,
        document_lines: usize,
    },

    /// The pattern's last line was not found after the anchored span.
    #[error("last line not found within {forward} lines after LN-{near}; requested '{expected}'")]
    EndLineMismatch {
        near: usize,
        forward: usize,
        expected: String,
    },

    /// An interior pattern line does not match the document verbatim.
    #[error("LN-{line} does not match; requested '{expected}', actually '{actual}'")]
    InteriorLineMismatch {
        line: usize,
        expected: String,
        actual: String,
    },

    /// The start marker was not found near the requested start line.
    #[error(
        "start marker not found near LN-{requested} (-{backward}/+{forward} lines); requested '{expected}', actually '{actual}'"
    )]
    StartMarkerNotFound {
        requested: usize,
        backward: usize,
        forward: usize,
        expected: String,
        actual: String,
    },

    /// The end marker was not found after the resolved start.
    #[error(
        "end marker not found within {forward} lines after LN-{requested}; requested '{expected}', actually '{actual}'"
    )]
    EndMarkerNotFound {
        requested: usize,
        forward: usize,
        expected: String,
        actual: String,
    },

    /// The requested or resolved line range does not fit the file.
    #[error("line range LN{start}~{end} is outside the {len}-line file")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },
}

impl EditError {
    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Create a backup error.
    pub fn backup(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::BackupError {
            path: path.into(),
            source,
        }
    }

    /// True for failures where the file was found but the edit could not be
    /// located; a corrected instruction may succeed where these failed.
    pub fn is_match_failure(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousMatch { .. }
                | Self::AnchorNotFound { .. }
                | Self::PatternExceedsDocument { .. }
                | Self::EndLineMismatch { .. }
                | Self::InteriorLineMismatch { .. }
                | Self::StartMarkerNotFound { .. }
                | Self::EndMarkerNotFound { .. }
                | Self::RangeOutOfBounds { .. }
        )
    }
}
