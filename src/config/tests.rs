use super::*;
use serial_test::serial;
use std::env;
use std::path::Path;
use tempfile::tempdir;

const VARS: &[&str] = &[
    ENV_VAR_LOGBOOK_FILE,
    ENV_VAR_LOGBOOK_BACKUP_DIR,
    ENV_VAR_LOGBOOK_HISTORY_SIZE,
    ENV_VAR_LOGBOOK_EDITOR,
    ENV_VAR_EDITOR,
    ENV_VAR_LOGBOOK_SEARCH_DISTANCE,
    ENV_VAR_LOGBOOK_SEARCH_CASE,
    ENV_VAR_LOGBOOK_SEARCH_MATCHING,
    ENV_VAR_LOGBOOK_DEFAULT_SECTION,
];

/// Clears the logbook variables for the duration of a test and restores
/// the previous values afterwards.
struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn new() -> Self {
        let saved = VARS.iter().map(|&var| (var, env::var(var).ok())).collect();
        for var in VARS {
            env::remove_var(var);
        }
        // absolute paths so validation passes regardless of HOME
        env::set_var(ENV_VAR_LOGBOOK_FILE, "/tmp/logbook-test/doing.md");
        env::set_var(ENV_VAR_LOGBOOK_BACKUP_DIR, "/tmp/logbook-test/backups");
        EnvGuard { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (var, value) in &self.saved {
            match value {
                Some(value) => env::set_var(var, value),
                None => env::remove_var(var),
            }
        }
    }
}

fn valid_config() -> Config {
    Config {
        journal_file: PathBuf::from("/home/me/doing.md"),
        backup_dir: PathBuf::from("/home/me/backups"),
        ..Config::default()
    }
}

#[test]
fn test_debug_impl_redacts_sensitive_info() {
    let config = Config {
        journal_file: PathBuf::from("/home/username/private/doing.md"),
        editor: "vim".to_string(),
        ..valid_config()
    };

    let debug_output = format!("{:?}", config);

    assert!(debug_output.contains(REDACTED_PLACEHOLDER));
    assert!(!debug_output.contains("vim"));
    assert!(!debug_output.contains("/home/username/private"));
    assert!(debug_output.contains("Currently"));
}

#[test]
#[serial]
fn test_load_defaults() {
    let _guard = EnvGuard::new();

    let config = Config::load().unwrap();
    assert_eq!(config.editor, "vim");
    assert_eq!(config.history_size, DEFAULT_HISTORY_SIZE);
    assert_eq!(config.search_distance, DEFAULT_FUZZY_DISTANCE);
    assert_eq!(config.search_case, Case::Smart);
    assert_eq!(config.search_matching, Matching::Fuzzy);
    assert_eq!(config.default_section, "Currently");
    assert_eq!(config.journal_file, Path::new("/tmp/logbook-test/doing.md"));
}

#[test]
#[serial]
fn test_load_editor_precedence() {
    let _guard = EnvGuard::new();

    env::set_var(ENV_VAR_EDITOR, "nano");
    assert_eq!(Config::load().unwrap().editor, "nano");

    env::set_var(ENV_VAR_LOGBOOK_EDITOR, "code");
    assert_eq!(Config::load().unwrap().editor, "code");
}

#[test]
#[serial]
fn test_load_expands_paths() {
    let _guard = EnvGuard::new();
    let temp_dir = tempdir().unwrap();
    env::set_var("LOGBOOK_TEST_ROOT", temp_dir.path());
    env::set_var(ENV_VAR_LOGBOOK_FILE, "$LOGBOOK_TEST_ROOT/doing.md");

    let config = Config::load().unwrap();
    env::remove_var("LOGBOOK_TEST_ROOT");

    assert_eq!(config.journal_file, temp_dir.path().join("doing.md"));
}

#[test]
#[serial]
fn test_load_search_settings() {
    let _guard = EnvGuard::new();
    env::set_var(ENV_VAR_LOGBOOK_SEARCH_DISTANCE, "1");
    env::set_var(ENV_VAR_LOGBOOK_SEARCH_CASE, "ignore");
    env::set_var(ENV_VAR_LOGBOOK_SEARCH_MATCHING, "exact");
    env::set_var(ENV_VAR_LOGBOOK_HISTORY_SIZE, "4");
    env::set_var(ENV_VAR_LOGBOOK_DEFAULT_SECTION, "Inbox");

    let config = Config::load().unwrap();
    assert_eq!(config.search_distance, 1);
    assert_eq!(config.search_case, Case::Ignore);
    assert_eq!(config.search_matching, Matching::Exact);
    assert_eq!(config.history_size, 4);
    assert_eq!(config.default_section, "Inbox");

    let now = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let ctx = config.query_context(now);
    assert_eq!(ctx.distance, 1);
    assert_eq!(ctx.case, Case::Ignore);
    assert_eq!(ctx.now, now);
}

#[test]
#[serial]
fn test_load_rejects_bad_numbers() {
    let _guard = EnvGuard::new();
    env::set_var(ENV_VAR_LOGBOOK_HISTORY_SIZE, "lots");

    match Config::load() {
        Err(AppError::Config(msg)) => assert!(msg.contains(ENV_VAR_LOGBOOK_HISTORY_SIZE)),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_load_config_with_invalid_editor() {
    let _guard = EnvGuard::new();

    env::set_var(ENV_VAR_LOGBOOK_EDITOR, "vim --noplugin");
    match Config::load() {
        Err(AppError::Config(msg)) => assert!(msg.contains("cannot contain spaces")),
        _ => panic!("Expected Config error for invalid editor"),
    }

    env::set_var(ENV_VAR_LOGBOOK_EDITOR, "echo>/tmp/pwned");
    match Config::load() {
        Err(AppError::Config(msg)) => {
            assert!(msg.contains("Editor command cannot contain shell metacharacters"))
        }
        _ => panic!("Expected Config error for metacharacters"),
    }
}

#[test]
fn test_validate() {
    assert!(valid_config().validate().is_ok());

    let relative = Config {
        backup_dir: PathBuf::from("backups"),
        ..valid_config()
    };
    match relative.validate() {
        Err(AppError::Config(msg)) => assert!(msg.contains("must be an absolute path")),
        _ => panic!("Expected Config error about relative path"),
    }

    let empty = Config {
        journal_file: PathBuf::new(),
        ..valid_config()
    };
    match empty.validate() {
        Err(AppError::Config(msg)) => assert!(msg.contains("Journal file path is empty")),
        _ => panic!("Expected Config error about empty path"),
    }

    let no_editor = Config {
        editor: String::new(),
        ..valid_config()
    };
    assert!(no_editor.validate().is_err());

    let no_history = Config {
        history_size: 0,
        ..valid_config()
    };
    assert!(no_history.validate().is_err());
}

#[test]
fn test_validate_editor_command_valid() {
    assert_eq!(Config::validate_editor_command("vim").unwrap(), "vim");
    assert_eq!(
        Config::validate_editor_command("/usr/bin/code").unwrap(),
        "/usr/bin/code"
    );
    assert_eq!(
        Config::validate_editor_command("./my-editor").unwrap(),
        "./my-editor"
    );
}

#[test]
fn test_validate_editor_command_with_metacharacters() {
    let test_cases = [
        ("echo>/tmp/file", '>'),
        ("echo|cat", '|'),
        ("vim;echo", ';'),
        ("$(echo)", '$'),
        ("`echo`", '`'),
        ("vim'~/test'", '\''),
        ("vim\\test", '\\'),
    ];

    for (cmd, ch) in test_cases.iter() {
        match Config::validate_editor_command(cmd) {
            Err(AppError::Config(msg)) => {
                assert!(msg.contains("Editor command cannot contain shell metacharacters"));
                assert!(msg.contains(&ch.to_string()));
            }
            _ => panic!("Expected Config error for metacharacter '{}'", ch),
        }
    }
}
