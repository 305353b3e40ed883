//! Editor abstraction for composing entries and notes.
//!
//! The application hands text to an editor and reads back the edited
//! result. Tests substitute a scripted editor.

use crate::errors::{AppError, AppResult, EditorError};
use std::fs;
use std::io::Write;
use std::process::Command;
use tempfile::Builder;
use tracing::debug;

/// Something that lets the user edit a piece of text.
///
/// # Examples
///
/// ```
/// use logbook::editor::Editor;
/// use logbook::errors::AppResult;
///
/// struct Shouty;
///
/// impl Editor for Shouty {
///     fn edit(&self, text: &str) -> AppResult<String> {
///         Ok(text.to_uppercase())
///     }
/// }
///
/// assert_eq!(Shouty.edit("draft").unwrap(), "DRAFT");
/// ```
pub trait Editor {
    /// Returns the edited version of `text`.
    ///
    /// # Errors
    ///
    /// Implementations return `AppError::Editor` when editing fails.
    fn edit(&self, text: &str) -> AppResult<String>;
}

/// Opens a temporary file in an external editor command.
///
/// ```no_run
/// use logbook::editor::{Editor, SystemEditor};
///
/// let editor = SystemEditor { editor_cmd: "vim".to_string() };
/// let text = editor.edit("Started the report\n").expect("editor failed");
/// ```
pub struct SystemEditor {
    /// The command to run (e.g. "vim", "nano"); validated by `Config`.
    pub editor_cmd: String,
}

impl SystemEditor {
    fn launch(&self, path: &std::path::Path) -> AppResult<()> {
        debug!("Launching editor: {}", self.editor_cmd);
        let editor_cmd = self.editor_cmd.clone();

        match Command::new(&self.editor_cmd).arg(path).status() {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(EditorError::NonZeroExit {
                command: editor_cmd,
                status_code: status.code().unwrap_or(-1),
            }
            .into()),
            Err(e) => {
                let specific_error = match e.kind() {
                    std::io::ErrorKind::NotFound => EditorError::CommandNotFound {
                        command: editor_cmd,
                        source: e,
                    },
                    std::io::ErrorKind::PermissionDenied => EditorError::PermissionDenied {
                        command: editor_cmd,
                        source: e,
                    },
                    _ => EditorError::ExecutionFailed {
                        command: editor_cmd,
                        source: e,
                    },
                };
                Err(specific_error.into())
            }
        }
    }
}

impl Editor for SystemEditor {
    /// Writes `text` to a temporary `.md` file, waits for the editor to exit,
    /// and reads the file back.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Editor` if the command cannot be run or exits
    /// non-zero, and `AppError::Io` if the temporary file fails.
    fn edit(&self, text: &str) -> AppResult<String> {
        let mut file = Builder::new().prefix("logbook-").suffix(".md").tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        self.launch(file.path())?;

        fs::read_to_string(file.path()).map_err(|e| AppError::path(file.path(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct MockEditor {
        pub seen: Arc<Mutex<Vec<String>>>,
        reply: String,
    }

    impl Editor for MockEditor {
        fn edit(&self, text: &str) -> AppResult<String> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_mock_editor_records_input() {
        let editor = MockEditor {
            seen: Arc::new(Mutex::new(Vec::new())),
            reply: "edited".to_string(),
        };

        assert_eq!(editor.edit("draft").unwrap(), "edited");
        assert_eq!(*editor.seen.lock().unwrap(), vec!["draft".to_string()]);
    }

    #[test]
    fn test_missing_command_is_reported() {
        let editor = SystemEditor {
            editor_cmd: "logbook-no-such-editor".to_string(),
        };
        match editor.edit("text") {
            Err(AppError::Editor(EditorError::CommandNotFound { command, .. })) => {
                assert_eq!(command, "logbook-no-such-editor");
            }
            other => panic!("Expected CommandNotFound, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_true_leaves_text_unchanged() {
        let editor = SystemEditor {
            editor_cmd: "true".to_string(),
        };
        assert_eq!(editor.edit("unchanged\n").unwrap(), "unchanged\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit() {
        let editor = SystemEditor {
            editor_cmd: "false".to_string(),
        };
        assert!(matches!(
            editor.edit("text"),
            Err(AppError::Editor(EditorError::NonZeroExit { status_code: 1, .. }))
        ));
    }
}
