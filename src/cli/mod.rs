//! Command-line interface definitions.
//!
//! Argument structs stay thin; the `*_options` helpers turn them into the
//! typed options the operations take.

use crate::constants::{APP_DESCRIPTION, APP_NAME};
use crate::errors::AppResult;
use crate::query::{
    Age, Bool, Completion, DateRange, FilterOptions, Matcher, QueryContext, SortOrder, TagFilter,
    ValueFilter,
};
use crate::tags::{split_tag_list, TagOp};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = APP_NAME, author, version, about = APP_DESCRIPTION, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Print verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add an entry
    Now(NowArgs),
    /// Mark the last entry done, or add a finished entry
    Done(DoneArgs),
    /// List entries
    Show(ShowArgs),
    /// Add, remove or rename tags on entries
    Tag(TagArgs),
    /// Restore an earlier version of the journal
    Undo(HistoryArgs),
    /// Reapply a version removed by undo
    Redo(HistoryArgs),
    /// List saved versions of the journal
    Backups,
}

#[derive(Args, Debug)]
pub struct NowArgs {
    /// Entry title, may include @tags
    #[arg(value_name = "TITLE")]
    pub title: Vec<String>,

    /// Note to attach
    #[arg(short, long)]
    pub note: Option<String>,

    /// Section to add to
    #[arg(short, long)]
    pub section: Option<String>,

    /// Backdate the entry, e.g. "30 minutes ago" or "yesterday 3pm"
    #[arg(short, long, value_name = "DATE")]
    pub back: Option<String>,

    /// Compose the entry in the configured editor
    #[arg(short, long)]
    pub editor: bool,
}

#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Title of a new, already finished entry
    #[arg(value_name = "TITLE")]
    pub title: Vec<String>,

    /// Section to use
    #[arg(short, long)]
    pub section: Option<String>,
}

/// Filter flags shared by `show` and `tag`.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Section title or prefix, "All" for every section
    #[arg(short, long)]
    pub section: Option<String>,

    /// Tags to filter by, comma separated
    #[arg(long)]
    pub tag: Option<String>,

    /// How tag and value filters combine: and, or, not, pattern
    #[arg(long = "bool", default_value = "pattern")]
    pub bool_mode: String,

    /// Text search: fuzzy by default, 'exact or /regex/
    #[arg(long)]
    pub search: Option<String>,

    /// Value query such as "@done > two hours ago"; repeatable
    #[arg(long = "val", value_name = "QUERY")]
    pub values: Vec<String>,

    /// Date range, e.g. "yesterday to now"
    #[arg(long, value_name = "RANGE")]
    pub from: Option<String>,

    /// Only finished entries
    #[arg(long, conflicts_with = "unfinished")]
    pub finished: bool,

    /// Only unfinished entries
    #[arg(long)]
    pub unfinished: bool,

    /// Maximum number of entries
    #[arg(short, long)]
    pub count: Option<usize>,

    /// Which end a count takes from: oldest or newest
    #[arg(long, default_value = "newest")]
    pub age: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output order: asc or desc
    #[arg(long, default_value = "asc")]
    pub sort: String,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TagArgs {
    /// Tags to apply, comma separated; "name(value)" sets a value
    #[arg(value_name = "TAGS")]
    pub tags: String,

    /// Remove the tags instead of adding them
    #[arg(short, long, conflicts_with = "rename")]
    pub remove: bool,

    /// Rename the given tag to this name
    #[arg(long, value_name = "NEW")]
    pub rename: Option<String>,

    /// Treat tag names as regular expressions
    #[arg(long)]
    pub regex: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// How many steps to go
    #[arg(default_value_t = 1)]
    pub count: usize,

    /// Choose the version from a list
    #[arg(short, long)]
    pub interactive: bool,
}

/// Joins positional words back into one title.
pub fn join_title(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}

impl FilterArgs {
    /// Compiles the flags into filter options.
    ///
    /// # Errors
    ///
    /// Returns the parse error of the first invalid flag: boolean mode, tag
    /// token, search pattern, value query, date range or age.
    pub fn filter_options(&self, ctx: &QueryContext) -> AppResult<FilterOptions> {
        let mode: Bool = self.bool_mode.parse()?;
        let tags = match self.tag.as_deref() {
            Some(list) => Some(TagFilter::parse(list, mode)?),
            None => None,
        };
        let search = match self.search.as_deref() {
            Some(query) => Some(Matcher::build(query, ctx)?),
            None => None,
        };
        let values = if self.values.is_empty() {
            None
        } else {
            Some(ValueFilter::new(&self.values, mode, ctx.now)?)
        };
        let date_range = match self.from.as_deref() {
            Some(range) => Some(DateRange::parse(range, ctx.now)?),
            None => None,
        };
        let completion = match (self.finished, self.unfinished) {
            (true, _) => Completion::Finished,
            (_, true) => Completion::Unfinished,
            _ => Completion::Any,
        };

        Ok(FilterOptions {
            section: self.section.clone(),
            tags,
            search,
            values,
            date_range,
            completion,
            count: self.count,
            age: self.age.parse::<Age>()?,
            sort: SortOrder::default(),
            now: ctx.now,
        })
    }
}

impl ShowArgs {
    /// Filter options including the output sort order.
    ///
    /// # Errors
    ///
    /// See [`FilterArgs::filter_options`]; an unknown sort order is a
    /// config error.
    pub fn filter_options(&self, ctx: &QueryContext) -> AppResult<FilterOptions> {
        Ok(FilterOptions {
            sort: self.sort.parse::<SortOrder>()?,
            ..self.filter.filter_options(ctx)?
        })
    }
}

impl TagArgs {
    /// One operation per comma-separated tag. With `--rename` only the first
    /// tag is used, as the name to rename from.
    pub fn tag_ops(&self) -> Vec<TagOp> {
        let names = split_tag_list(&self.tags)
            .into_iter()
            .map(|t| t.trim_start_matches('@'))
            .filter(|t| !t.is_empty());

        let ops: Vec<TagOp> = match &self.rename {
            Some(to) => names.take(1).map(|from| TagOp::rename(from, to)).collect(),
            None => names
                .map(|token| {
                    let (name, value) = split_value(token);
                    let op = if self.remove {
                        TagOp::remove(name)
                    } else {
                        TagOp::add(name)
                    };
                    match value {
                        Some(value) => op.with_value(value),
                        None => op,
                    }
                })
                .collect(),
        };

        if self.regex {
            ops.into_iter().map(TagOp::regex).collect()
        } else {
            ops
        }
    }
}

/// Splits `name(value)` into its parts.
fn split_value(token: &str) -> (&str, Option<&str>) {
    match token.find('(') {
        Some(open) if token.ends_with(')') => {
            (&token[..open], Some(&token[open + 1..token.len() - 1]))
        }
        _ => (token, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> QueryContext {
        QueryContext::new(
            NaiveDate::from_ymd_opt(2024, 1, 10)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_now_args() {
        let args = CliArgs::parse_from([
            "logbook", "now", "Write", "docs", "@writing", "--note", "intro first", "-s", "Later",
            "--back", "1h ago",
        ]);
        match args.command {
            Command::Now(now) => {
                assert_eq!(join_title(&now.title), "Write docs @writing");
                assert_eq!(now.note.as_deref(), Some("intro first"));
                assert_eq!(now.section.as_deref(), Some("Later"));
                assert_eq!(now.back.as_deref(), Some("1h ago"));
                assert!(!now.editor);
            }
            other => panic!("Expected now, got {:?}", other),
        }
        assert!(!args.verbose);
    }

    #[test]
    fn test_verbose_is_global() {
        let args = CliArgs::parse_from(["logbook", "show", "--verbose"]);
        assert!(args.verbose);
        let args = CliArgs::parse_from(["logbook", "-v", "backups"]);
        assert!(args.verbose);
        assert!(matches!(args.command, Command::Backups));
    }

    #[test]
    fn test_show_args_to_options() {
        let args = CliArgs::parse_from([
            "logbook", "show", "--tag", "code,-done", "--val", "@done > 2 hours ago", "--search",
            "prsr", "--count", "3", "--age", "oldest", "--sort", "desc", "--unfinished",
        ]);
        let Command::Show(show) = args.command else {
            panic!("Expected show");
        };
        let options = show.filter_options(&ctx()).unwrap();
        assert!(options.tags.is_some());
        assert!(options.values.is_some());
        assert!(options.search.is_some());
        assert_eq!(options.count, Some(3));
        assert_eq!(options.age, Age::Oldest);
        assert_eq!(options.sort, SortOrder::Desc);
        assert_eq!(options.completion, Completion::Unfinished);
        assert_eq!(options.now, ctx().now);
    }

    #[test]
    fn test_show_rejects_bad_flags() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["logbook", "show"];
            argv.extend_from_slice(extra);
            let Command::Show(show) = CliArgs::parse_from(argv).command else {
                panic!("Expected show");
            };
            show.filter_options(&ctx())
        };
        assert!(parse(&["--bool", "maybe"]).is_err());
        assert!(parse(&["--sort", "sideways"]).is_err());
        assert!(parse(&["--from", "the dawn of time"]).is_err());
        assert!(parse(&["--val", "no operator here"]).is_err());
        assert!(parse(&[]).is_ok());
    }

    #[test]
    fn test_finished_conflicts_with_unfinished() {
        assert!(CliArgs::try_parse_from(["logbook", "show", "--finished", "--unfinished"]).is_err());
    }

    #[test]
    fn test_tag_ops() {
        let args = CliArgs::parse_from(["logbook", "tag", "@flow,priority(2)"]);
        let Command::Tag(tag) = args.command else {
            panic!("Expected tag");
        };
        assert_eq!(
            tag.tag_ops(),
            vec![TagOp::add("flow"), TagOp::add("priority").with_value("2")]
        );

        let args = CliArgs::parse_from(["logbook", "tag", "flow", "--remove", "--tag", "code"]);
        let Command::Tag(tag) = args.command else {
            panic!("Expected tag");
        };
        assert_eq!(tag.tag_ops(), vec![TagOp::remove("flow")]);
        assert_eq!(tag.filter.tag.as_deref(), Some("code"));

        let args = CliArgs::parse_from(["logbook", "tag", "code", "--rename", "dev"]);
        let Command::Tag(tag) = args.command else {
            panic!("Expected tag");
        };
        assert_eq!(tag.tag_ops(), vec![TagOp::rename("code", "dev")]);

        let args = CliArgs::parse_from(["logbook", "tag", "done(2024-01-01 10:00), flow"]);
        let Command::Tag(tag) = args.command else {
            panic!("Expected tag");
        };
        let ops = tag.tag_ops();
        assert_eq!(
            ops,
            vec![
                TagOp::add("done").with_value("2024-01-01 10:00"),
                TagOp::add("flow")
            ]
        );
        assert_eq!(
            crate::tags::apply("Task", &ops[0]).unwrap(),
            "Task @done(2024-01-01 10:00)"
        );
    }

    #[test]
    fn test_history_args() {
        let args = CliArgs::parse_from(["logbook", "undo"]);
        match args.command {
            Command::Undo(h) => {
                assert_eq!(h.count, 1);
                assert!(!h.interactive);
            }
            other => panic!("Expected undo, got {:?}", other),
        }
        let args = CliArgs::parse_from(["logbook", "redo", "3", "-i"]);
        match args.command {
            Command::Redo(h) => {
                assert_eq!(h.count, 3);
                assert!(h.interactive);
            }
            other => panic!("Expected redo, got {:?}", other),
        }
    }
}
