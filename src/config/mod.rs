//! Configuration management for the logbook application.
//!
//! Settings come from environment variables with sensible defaults. Paths
//! are expanded with `shellexpand`, so `~` and `$VAR` references work.
//!
//! # Environment Variables
//!
//! - `LOGBOOK_FILE`: the journal file (defaults to `~/what_was_i_doing.md`)
//! - `LOGBOOK_BACKUP_DIR`: snapshot directory (defaults to
//!   `~/.local/share/logbook/backups`)
//! - `LOGBOOK_HISTORY_SIZE`: snapshots kept per file (defaults to 15)
//! - `LOGBOOK_EDITOR`: editor for notes, falling back to `EDITOR`, then `vim`
//! - `LOGBOOK_SEARCH_DISTANCE`, `LOGBOOK_SEARCH_CASE`,
//!   `LOGBOOK_SEARCH_MATCHING`: search defaults
//! - `LOGBOOK_DEFAULT_SECTION`: section new entries go to (defaults to
//!   `Currently`)

use crate::constants::{
    DEFAULT_BACKUP_DIR, DEFAULT_EDITOR_COMMAND, DEFAULT_FUZZY_DISTANCE, DEFAULT_HISTORY_SIZE,
    DEFAULT_JOURNAL_FILE, DEFAULT_SECTION, EDITOR_FORBIDDEN_CHARS, ENV_VAR_EDITOR,
    ENV_VAR_LOGBOOK_BACKUP_DIR, ENV_VAR_LOGBOOK_DEFAULT_SECTION, ENV_VAR_LOGBOOK_EDITOR,
    ENV_VAR_LOGBOOK_FILE, ENV_VAR_LOGBOOK_HISTORY_SIZE, ENV_VAR_LOGBOOK_SEARCH_CASE,
    ENV_VAR_LOGBOOK_SEARCH_DISTANCE, ENV_VAR_LOGBOOK_SEARCH_MATCHING, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use crate::query::{Case, Matching, QueryContext};
use chrono::NaiveDateTime;
use std::env;
use std::fmt;
use std::path::PathBuf;

#[cfg(test)]
mod tests;

/// Configuration for the logbook application.
///
/// # Examples
///
/// Loading configuration from environment variables:
/// ```no_run
/// use logbook::Config;
/// use std::env;
///
/// env::set_var("LOGBOOK_EDITOR", "nano");
/// env::set_var("LOGBOOK_FILE", "/tmp/doing.md");
///
/// let config = Config::load().expect("Failed to load configuration");
/// assert_eq!(config.editor, "nano");
/// ```
#[derive(Clone)]
pub struct Config {
    /// The journal file.
    pub journal_file: PathBuf,

    /// Where snapshots of the journal are kept.
    pub backup_dir: PathBuf,

    /// How many normal snapshots to keep per journal file.
    pub history_size: usize,

    /// Editor command for notes.
    ///
    /// Loaded from, in order of precedence:
    /// 1. LOGBOOK_EDITOR
    /// 2. EDITOR
    /// 3. Defaults to "vim" if neither is set
    pub editor: String,

    /// Characters allowed between letters of a fuzzy search word.
    pub search_distance: usize,

    pub search_case: Case,

    pub search_matching: Matching,

    /// Section that receives new entries.
    pub default_section: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("journal_file", &REDACTED_PLACEHOLDER)
            .field("backup_dir", &REDACTED_PLACEHOLDER)
            .field("history_size", &self.history_size)
            .field("editor", &REDACTED_PLACEHOLDER)
            .field("search_distance", &self.search_distance)
            .field("search_case", &self.search_case)
            .field("search_matching", &self.search_matching)
            .field("default_section", &self.default_section)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            journal_file: PathBuf::new(),
            backup_dir: PathBuf::new(),
            history_size: DEFAULT_HISTORY_SIZE,
            editor: DEFAULT_EDITOR_COMMAND.to_string(),
            search_distance: DEFAULT_FUZZY_DISTANCE,
            search_case: Case::default(),
            search_matching: Matching::default(),
            default_section: DEFAULT_SECTION.to_string(),
        }
    }
}

fn expand_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path '{}': {}", raw, e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

fn parse_count(var: &str, raw: &str) -> AppResult<usize> {
    raw.trim().parse::<usize>().map_err(|_| {
        AppError::Config(format!(
            "{} must be a non-negative integer, got '{}'",
            var, raw
        ))
    })
}

impl Config {
    /// Validates an editor command string for security.
    ///
    /// The command must be non-empty and free of spaces and shell
    /// metacharacters; editors needing arguments go through a wrapper script.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first problem found.
    pub fn validate_editor_command(editor_cmd: &str) -> AppResult<&str> {
        if editor_cmd.is_empty() {
            return Err(AppError::Config(
                "Editor command cannot be empty".to_string(),
            ));
        }

        if editor_cmd.contains(' ') {
            return Err(AppError::Config(
                "Editor command cannot contain spaces. Use a wrapper script or shell alias for editors requiring arguments".to_string(),
            ));
        }

        if let Some(ch) = EDITOR_FORBIDDEN_CHARS
            .iter()
            .find(|&&ch| editor_cmd.contains(ch))
        {
            return Err(AppError::Config(format!(
                "Editor command cannot contain shell metacharacters: '{}'. Use a wrapper script or shell alias instead",
                ch
            )));
        }

        Ok(editor_cmd)
    }

    /// Loads configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - a path fails to expand
    /// - the editor command fails validation
    /// - a numeric or enumerated setting does not parse
    pub fn load() -> AppResult<Self> {
        let editor_raw = env::var(ENV_VAR_LOGBOOK_EDITOR)
            .or_else(|_| env::var(ENV_VAR_EDITOR))
            .unwrap_or_else(|_| DEFAULT_EDITOR_COMMAND.to_string());
        let editor = Config::validate_editor_command(&editor_raw)?.to_string();

        let journal_file = expand_path(
            &env::var(ENV_VAR_LOGBOOK_FILE).unwrap_or_else(|_| DEFAULT_JOURNAL_FILE.to_string()),
        )?;
        let backup_dir = expand_path(
            &env::var(ENV_VAR_LOGBOOK_BACKUP_DIR)
                .unwrap_or_else(|_| DEFAULT_BACKUP_DIR.to_string()),
        )?;

        let history_size = match env::var(ENV_VAR_LOGBOOK_HISTORY_SIZE) {
            Ok(raw) => parse_count(ENV_VAR_LOGBOOK_HISTORY_SIZE, &raw)?,
            Err(_) => DEFAULT_HISTORY_SIZE,
        };
        let search_distance = match env::var(ENV_VAR_LOGBOOK_SEARCH_DISTANCE) {
            Ok(raw) => parse_count(ENV_VAR_LOGBOOK_SEARCH_DISTANCE, &raw)?,
            Err(_) => DEFAULT_FUZZY_DISTANCE,
        };
        let search_case = match env::var(ENV_VAR_LOGBOOK_SEARCH_CASE) {
            Ok(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("{}: {}", ENV_VAR_LOGBOOK_SEARCH_CASE, e)))?,
            Err(_) => Case::default(),
        };
        let search_matching = match env::var(ENV_VAR_LOGBOOK_SEARCH_MATCHING) {
            Ok(raw) => raw.parse()?,
            Err(_) => Matching::default(),
        };
        let default_section = env::var(ENV_VAR_LOGBOOK_DEFAULT_SECTION)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| DEFAULT_SECTION.to_string());

        let config = Config {
            journal_file,
            backup_dir,
            history_size,
            editor,
            search_distance,
            search_case,
            search_matching,
            default_section,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - the journal file or backup directory path is empty or relative
    /// - the editor command is empty
    /// - the history size is zero
    /// - the default section is blank
    ///
    /// # Examples
    ///
    /// ```
    /// use logbook::Config;
    /// use std::path::PathBuf;
    ///
    /// let config = Config {
    ///     journal_file: PathBuf::from("/home/me/doing.md"),
    ///     backup_dir: PathBuf::from("/home/me/.backups"),
    ///     ..Config::default()
    /// };
    /// assert!(config.validate().is_ok());
    ///
    /// let relative = Config {
    ///     journal_file: PathBuf::from("doing.md"),
    ///     ..config
    /// };
    /// assert!(relative.validate().is_err());
    /// ```
    pub fn validate(&self) -> AppResult<()> {
        for (label, path) in [
            ("Journal file", &self.journal_file),
            ("Backup directory", &self.backup_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(AppError::Config(format!("{} path is empty", label)));
            }
            if !path.is_absolute() {
                return Err(AppError::Config(format!(
                    "{} must be an absolute path",
                    label
                )));
            }
        }

        if self.editor.is_empty() {
            return Err(AppError::Config("Editor command is empty".to_string()));
        }

        if self.history_size == 0 {
            return Err(AppError::Config(
                "History size must be at least 1".to_string(),
            ));
        }

        if self.default_section.is_empty() {
            return Err(AppError::Config("Default section is empty".to_string()));
        }

        Ok(())
    }

    /// Search defaults bundled with the reference time.
    pub fn query_context(&self, now: NaiveDateTime) -> QueryContext {
        QueryContext {
            distance: self.search_distance,
            case: self.search_case,
            matching: self.search_matching,
            now,
        }
    }
}
