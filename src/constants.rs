//! Constants used throughout the application.
//!
//! This module contains all constants used in the logbook application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "logbook";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A plain-text log of what you were doing";

// CLI Arguments & Defaults
/// Default command for the editor if not specified otherwise.
pub const DEFAULT_EDITOR_COMMAND: &str = "vim";
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// Configuration Keys & Environment Variables
/// Environment variable for the journal file.
pub const ENV_VAR_LOGBOOK_FILE: &str = "LOGBOOK_FILE";
/// Environment variable for the snapshot directory.
pub const ENV_VAR_LOGBOOK_BACKUP_DIR: &str = "LOGBOOK_BACKUP_DIR";
/// Environment variable for the number of snapshots retained.
pub const ENV_VAR_LOGBOOK_HISTORY_SIZE: &str = "LOGBOOK_HISTORY_SIZE";
/// Environment variable for specifying the preferred editor.
pub const ENV_VAR_LOGBOOK_EDITOR: &str = "LOGBOOK_EDITOR";
/// Standard environment variable for specifying the default editor.
pub const ENV_VAR_EDITOR: &str = "EDITOR";
/// Environment variable for the fuzzy search character distance.
pub const ENV_VAR_LOGBOOK_SEARCH_DISTANCE: &str = "LOGBOOK_SEARCH_DISTANCE";
/// Environment variable for the search case rule.
pub const ENV_VAR_LOGBOOK_SEARCH_CASE: &str = "LOGBOOK_SEARCH_CASE";
/// Environment variable for the default search matching mode.
pub const ENV_VAR_LOGBOOK_SEARCH_MATCHING: &str = "LOGBOOK_SEARCH_MATCHING";
/// Environment variable for the section new entries go to.
pub const ENV_VAR_LOGBOOK_DEFAULT_SECTION: &str = "LOGBOOK_DEFAULT_SECTION";
/// Environment variable for the log output format.
pub const ENV_VAR_LOGBOOK_LOG_FORMAT: &str = "LOGBOOK_LOG_FORMAT";

/// Default journal file, relative to the home directory.
pub const DEFAULT_JOURNAL_FILE: &str = "~/what_was_i_doing.md";
/// Default snapshot directory.
pub const DEFAULT_BACKUP_DIR: &str = "~/.local/share/logbook/backups";
/// Number of snapshots kept per journal file.
pub const DEFAULT_HISTORY_SIZE: usize = 15;
/// Section used when none is given.
pub const DEFAULT_SECTION: &str = "Currently";

// Validation
/// Characters forbidden in editor commands for security reasons.
pub const EDITOR_FORBIDDEN_CHARS: &[char] =
    &['|', '&', ';', '$', '(', ')', '`', '\\', '<', '>', '\'', '"'];
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Journal format
/// Timestamp format of an item line.
pub const ITEM_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Timestamp format used as a backup filename prefix.
pub const BACKUP_STAMP_FORMAT: &str = "%Y-%m-%d_%H.%M.%S";
/// Separator between the backup stamp and the original file name.
pub const BACKUP_SEPARATOR: &str = "___";
/// Prefix of snapshots waiting to be redone.
pub const UNDONE_PREFIX: &str = "undone";
/// Tag marking an item as finished.
pub const DONE_TAG: &str = "done";
/// Tag recording the section an item was moved out of.
pub const FROM_TAG: &str = "from";

// Search
/// Characters allowed between two letters of a fuzzy search word.
pub const DEFAULT_FUZZY_DISTANCE: usize = 3;

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "logbook";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
