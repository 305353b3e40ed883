use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

use test_helpers::TestJournal;

#[test]
fn test_cli_now_then_show() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = TestJournal::in_dir(temp_dir.path());

    journal
        .command()
        .args(["now", "Write", "the", "parser", "@code", "--note", "start with headings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New entry: Write the parser @code"));

    let text = fs::read_to_string(&journal.file).unwrap();
    assert!(text.starts_with("Currently:\n\t- "));
    assert!(text.contains(" | Write the parser @code\n\t\tstart with headings\n"));

    journal
        .command()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("| Write the parser @code"))
        .stdout(predicate::str::contains("    start with headings"));
}

#[test]
fn test_cli_sections_and_filters() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = TestJournal::in_dir(temp_dir.path());

    journal
        .command()
        .args(["now", "Plan the week @planning", "--section", "Later", "--back", "2 hours ago"])
        .assert()
        .success();
    journal
        .command()
        .args(["now", "Fix the build @code"])
        .assert()
        .success();

    journal
        .command()
        .args(["show", "--section", "lat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan the week"))
        .stdout(predicate::str::contains("Fix the build").not());

    journal
        .command()
        .args(["show", "--section", "All", "--tag", "code"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fix the build"))
        .stdout(predicate::str::contains("Plan the week").not());

    journal
        .command()
        .args(["show", "--section", "All", "--search", "'week"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan the [week]"));
}

#[test]
fn test_cli_done_marks_last_entry() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = TestJournal::in_dir(temp_dir.path());

    journal
        .command()
        .args(["now", "Review pull request"])
        .assert()
        .success();
    journal
        .command()
        .arg("done")
        .assert()
        .success()
        .stdout(predicate::str::contains("Finished: Review pull request @done("));

    journal
        .command()
        .args(["show", "--unfinished"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No items matched"));
}

#[test]
fn test_cli_done_with_title_adds_finished_entry() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = TestJournal::in_dir(temp_dir.path());

    journal
        .command()
        .args(["done", "Answer email"])
        .assert()
        .success();

    let output = journal.command().args(["show", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["title"].as_str().unwrap().split(" @done").next(), Some("Answer email"));
    assert_eq!(value[0]["done"], true);
    assert_eq!(value[0]["section"], "Currently");
}

#[test]
fn test_cli_tag_then_undo_and_redo() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = TestJournal::in_dir(temp_dir.path());

    journal
        .command()
        .args(["now", "Refactor config"])
        .assert()
        .success();
    let before = fs::read_to_string(&journal.file).unwrap();

    journal
        .command()
        .args(["tag", "flow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tagged: Refactor config @flow"));
    let tagged = fs::read_to_string(&journal.file).unwrap();
    assert!(tagged.contains("Refactor config @flow"));

    journal.command().arg("undo").assert().success();
    assert_eq!(fs::read_to_string(&journal.file).unwrap(), before);

    journal
        .command()
        .arg("backups")
        .assert()
        .success()
        .stdout(predicate::str::contains("redo"));

    journal.command().arg("redo").assert().success();
    assert_eq!(fs::read_to_string(&journal.file).unwrap(), tagged);
}

#[test]
fn test_cli_recoverable_errors_exit_zero() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = TestJournal::in_dir(temp_dir.path());

    journal
        .command()
        .arg("undo")
        .assert()
        .success()
        .stderr(predicate::str::contains("No backups found"));

    journal
        .command()
        .arg("backups")
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups"));
}

#[test]
fn test_cli_invalid_input_fails() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = TestJournal::in_dir(temp_dir.path());

    journal
        .command()
        .args(["show", "--bool", "xor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));

    journal
        .command()
        .args(["now", "Late start", "--back", "the dawn of time"])
        .assert()
        .failure();
    assert!(!journal.file.exists());
}

#[test]
fn test_cli_relative_journal_path_is_rejected() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = TestJournal::in_dir(temp_dir.path());

    journal
        .command()
        .env("LOGBOOK_FILE", "doing.md")
        .args(["now", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absolute path"));
}

#[test]
fn test_cli_json_logs_carry_correlation_id() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = TestJournal::in_dir(temp_dir.path());

    journal
        .command()
        .env("LOGBOOK_LOG_FORMAT", "json")
        .env("RUST_LOG", "debug")
        .args(["now", "Logged entry"])
        .assert()
        .success()
        .stderr(predicate::str::contains("correlation_id"))
        .stderr(predicate::str::contains("app_invocation"));
}
