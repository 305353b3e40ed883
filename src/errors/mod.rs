//! Error handling utilities for the logbook application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Errors fall into four groups:
//!
//! - user input errors (`QueryError`): malformed tag booleans, dates, operators
//! - state errors (`BackupError`, `ContentError`): nothing to undo, unknown section
//! - collaborator errors (`EditorError`): the external editor failed
//! - resource errors (`AppError::Io`): always fatal
//!
//! Core components never print or exit; they return these values and let the
//! command line layer decide what to do with them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents specific error cases that can occur when interacting with external editors.
///
/// # Examples
///
/// ```
/// use logbook::errors::EditorError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "command not found");
/// let error = EditorError::CommandNotFound {
///     command: "vim".to_string(),
///     source: io_error,
/// };
///
/// assert!(format!("{}", error).contains("not found"));
/// assert!(format!("{}", error).contains("vim"));
/// ```
#[derive(Debug, Error)]
pub enum EditorError {
    /// Error when the specified editor command cannot be found.
    #[error("Editor command '{command}' not found: {source}. Please check that the editor is installed and available in your PATH.")]
    CommandNotFound {
        /// The editor command that was not found
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when permission is denied to execute the editor command.
    #[error("Permission denied when trying to execute editor '{command}': {source}. Please check file permissions or try running with appropriate access rights.")]
    PermissionDenied {
        /// The editor command that had permission denied
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when the editor command fails to execute due to other I/O errors.
    #[error("Failed to execute editor '{command}': {source}")]
    ExecutionFailed {
        /// The editor command that failed to execute
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when the editor exits with a non-zero status code.
    #[error("Editor '{command}' exited with non-zero status code: {status_code}")]
    NonZeroExit {
        /// The editor command that exited with a non-zero status
        command: String,
        /// The exit status code
        status_code: i32,
    },
}

/// Invalid user input handed to the tag language or the query engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid boolean '{0}'. Use AND, OR, NOT or PATTERN")]
    InvalidBool(String),

    #[error("Unable to parse date expression '{0}'")]
    InvalidDate(String),

    #[error("Invalid comparison operator '{0}'. Use one of <, >, <=, >=, ==, !=, *=, ^=, $=")]
    InvalidOperator(String),

    #[error("Invalid value query '{0}'. Expected @tag OP value")]
    InvalidValueQuery(String),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as compiled
        pattern: String,
        /// The regex engine's complaint
        message: String,
    },

    #[error("Invalid case setting '{0}'. Use smart, sensitive or ignore")]
    InvalidCase(String),

    #[error("Empty query")]
    EmptyQuery,
}

/// Recoverable states of the snapshot history.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackupError {
    #[error("No backups found for {0}")]
    NoBackups(String),

    #[error("No redo history available for {0}")]
    NoRedo(String),

    #[error("Only {available} backups available, cannot go back {requested}")]
    CountOutOfRange {
        /// Requested position, 1-indexed
        requested: usize,
        /// Number of candidates on disk
        available: usize,
    },

    #[error("Selection cancelled")]
    SelectionCancelled,
}

/// Lookups against the parsed journal that came back empty.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("No items matched the given filters")]
    NoResults,

    #[error("Entry title is empty")]
    EmptyEntry,
}

/// Represents all possible errors that can occur in the logbook application.
///
/// Note: This type does not implement `Clone` to avoid losing error context when
/// cloning `std::io::Error` values.
///
/// # Examples
///
/// ```
/// use logbook::errors::AppError;
///
/// let error = AppError::Config("Missing journal file".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Missing journal file");
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to access {path}: {source}")]
    Path {
        /// File or directory being touched
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid argument: {0}")]
    Query(#[from] QueryError),

    #[error("{0}")]
    Backup(#[from] BackupError),

    #[error("{0}")]
    Content(#[from] ContentError),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),
}

impl AppError {
    /// Wraps an I/O error with the path it concerns.
    pub fn path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Path {
            path: path.into(),
            source,
        }
    }

    /// Whether the caller may report the error and carry on.
    ///
    /// State errors (nothing to undo, no matching items, unknown section) are
    /// recoverable. Filesystem, configuration and editor failures are not, and
    /// neither is malformed user input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Backup(_) | AppError::Content(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
