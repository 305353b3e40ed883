use chrono::NaiveDate;
use logbook::content::Content;
use logbook::tags::TagOp;
use logbook::{Item, Note};

const JOURNAL: &str = "\
Currently: @focus
\t- 2024-01-10 09:00 | Standup @meeting @done(2024-01-10 09:15)
\t- 2024-01-10 10:00 | Write parser @code @project(logbook)
\t\tsplit on tabs
\t\tthen on pipes
Later:
\t- 2024-01-09 16:00 | Read paper @reading
Archive:
\t- 2024-01-01 08:00 | Old thing @done(2024-01-01 09:00) @from(Currently)
";

fn item(title: &str) -> Item {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    Item::new(date, title, "Currently")
}

#[test]
fn test_round_trip_is_exact() {
    let content = Content::parse(JOURNAL);
    assert_eq!(content.to_string(), JOURNAL);
    assert_eq!(Content::parse(&content.to_string()).to_string(), JOURNAL);
}

#[test]
fn test_parsed_structure() {
    let content = Content::parse(JOURNAL);
    assert_eq!(content.section_titles(), vec!["Currently", "Later", "Archive"]);
    assert_eq!(content.items().len(), 4);

    let current = content.in_section("Currently");
    let parser = current[1];
    assert_eq!(parser.title(), "Write parser @code @project(logbook)");
    assert_eq!(parser.note.lines(), &["split on tabs", "then on pipes"]);
    assert_eq!(parser.tag_value("project").as_deref(), Some("logbook"));

    let standup = content.in_section("currently")[0];
    assert!(standup.is_finished());
    assert_eq!(standup.interval().map(|d| d.num_minutes()), Some(15));
}

#[test]
fn test_edits_keep_the_rest_of_the_file() {
    let mut content = Content::parse(JOURNAL);
    let old = content.in_section("Later")[0].clone();
    let mut new = old.clone();
    new.tag(&TagOp::add("done").with_value("2024-01-09 17:00")).unwrap();
    content.update_item(&old, new).unwrap();

    let expected = JOURNAL.replace(
        "Read paper @reading\n",
        "Read paper @reading @done(2024-01-09 17:00)\n",
    );
    assert_eq!(content.to_string(), expected);
}

#[test]
fn test_tag_add_is_idempotent() {
    let mut once = item("Deploy");
    once.tag(&TagOp::add("foo")).unwrap();
    let mut twice = once.clone();
    twice.tag(&TagOp::add("foo")).unwrap();
    assert_eq!(once.title(), "Deploy @foo");
    assert_eq!(twice.title(), once.title());
}

#[test]
fn test_any_tag_mutation_dedups() {
    let mut item = item("Fix @x @x(1) @x(2)");
    item.tag(&TagOp::add("y")).unwrap();
    assert_eq!(item.title(), "Fix @x @y");
    assert_eq!(item.tags(), vec!["x", "y"]);
}

#[test]
fn test_tag_case_sensitivity() {
    let upper = item("Plan @Foo");
    let lower = item("Plan @foo");
    let shout = item("Plan @FOO");

    assert!(upper.has_tag("Foo"));
    assert!(!lower.has_tag("Foo"));
    assert!(!shout.has_tag("Foo"));

    assert!(upper.has_tag("foo"));
    assert!(lower.has_tag("foo"));
    assert!(shout.has_tag("foo"));
}

#[test]
fn test_rename_and_remove_keep_spacing() {
    let mut item = item("Ship @wip release @team(core)");
    item.tag(&TagOp::rename("wip", "done")).unwrap();
    assert_eq!(item.title(), "Ship @done release @team(core)");
    item.tag(&TagOp::remove("team")).unwrap();
    assert_eq!(item.title(), "Ship @done release");
}

#[test]
fn test_note_equality_ignores_blank_lines() {
    let a = Note::from_text("one\n\ntwo\n");
    let b = Note::from_text("  one\ntwo");
    assert_eq!(a, b);
}
