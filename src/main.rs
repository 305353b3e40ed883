/*!
# Logbook - A plain-text log of what you were doing

Logbook keeps a journal of timestamped entries in a single Markdown-like file,
grouped into sections. Entries carry `@tags`, optional notes and an `@done`
timestamp when finished. Every write snapshots the previous file so changes
can be undone and redone.

## Usage

```
logbook <COMMAND>

Commands:
  now      Add an entry
  done     Mark the last entry done, or add a finished entry
  show     List entries
  tag      Add, remove or rename tags on entries
  undo     Restore an earlier version of the journal
  redo     Reapply a version removed by undo
  backups  List saved versions of the journal
```

## Configuration

See [`logbook::config`] for the environment variables. Logging is controlled
by `RUST_LOG` (or `--verbose`) and `LOGBOOK_LOG_FORMAT` (`text` or `json`).
*/

use chrono::Local;
use clap::Parser;
use logbook::backup::{BackupChooser, BackupManager, DialoguerChooser};
use logbook::cli::{join_title, CliArgs, Command, HistoryArgs};
use logbook::config::Config;
use logbook::constants::{
    DEFAULT_LOG_LEVEL, ENV_VAR_LOGBOOK_LOG_FORMAT, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
    TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME,
};
use logbook::editor::{Editor, SystemEditor};
use logbook::errors::AppResult;
use logbook::ops::{self, AddOptions, OutputFormat, Step};
use std::process::ExitCode;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber: level from `RUST_LOG`, else debug with
/// `--verbose`, else the default; text or JSON lines on stderr.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { DEFAULT_LOG_LEVEL })
    });
    let format =
        std::env::var(ENV_VAR_LOGBOOK_LOG_FORMAT).unwrap_or_else(|_| LOG_FORMAT_TEXT.to_string());
    let json = format.trim().eq_ignore_ascii_case(LOG_FORMAT_JSON);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn history_step<'a>(args: &HistoryArgs, chooser: &'a dyn BackupChooser) -> Step<'a> {
    if args.interactive {
        Step::Choose(chooser)
    } else {
        Step::Count(args.count)
    }
}

/// Runs one command.
///
/// # Flow
///
/// 1. Load and validate configuration
/// 2. Build the backup manager and query context from it
/// 3. Dispatch the subcommand and print its result to stdout
fn run(args: CliArgs) -> AppResult<()> {
    let now = Local::now().naive_local();

    info!("Loading configuration");
    let config = Config::load()?;
    debug!("Configuration: {:?}", config);
    let backups = BackupManager::from_config(&config);
    let ctx = config.query_context(now);

    match args.command {
        Command::Now(now_args) => {
            let system_editor = SystemEditor {
                editor_cmd: config.editor.clone(),
            };
            let options = AddOptions {
                section: now_args.section,
                note: now_args.note,
                back: now_args.back,
                finish: false,
            };
            let editor: Option<&dyn Editor> = if now_args.editor {
                Some(&system_editor)
            } else {
                None
            };
            let item = ops::add_entry(
                &config,
                &backups,
                editor,
                &join_title(&now_args.title),
                &options,
                now,
            )?;
            println!("New entry: {}", item.title());
        }
        Command::Done(done_args) => {
            let item = if done_args.title.is_empty() {
                ops::finish_last(&config, &backups, done_args.section.as_deref(), now)?
            } else {
                let options = AddOptions {
                    section: done_args.section,
                    finish: true,
                    ..Default::default()
                };
                ops::add_entry(
                    &config,
                    &backups,
                    None,
                    &join_title(&done_args.title),
                    &options,
                    now,
                )?
            };
            println!("Finished: {}", item.title());
        }
        Command::Show(show_args) => {
            let options = show_args.filter_options(&ctx)?;
            let format = if show_args.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };
            let out = ops::show_items(&config, &options, format)?;
            print!("{}", out);
            if format == OutputFormat::Json {
                println!();
            }
        }
        Command::Tag(tag_args) => {
            let options = tag_args.filter.filter_options(&ctx)?;
            let changed = ops::tag_items(&config, &backups, &options, &tag_args.tag_ops())?;
            for item in &changed {
                println!("Tagged: {}", item.title());
            }
            if changed.is_empty() {
                println!("No entries changed");
            }
        }
        Command::Undo(history) => {
            let entry = ops::undo(&config, &backups, history_step(&history, &DialoguerChooser))?;
            println!(
                "Restored version from {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S")
            );
        }
        Command::Redo(history) => {
            let entry = ops::redo(&config, &backups, history_step(&history, &DialoguerChooser))?;
            println!(
                "Reapplied version from {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S")
            );
        }
        Command::Backups => {
            let listing = ops::list_history(&config, &backups, now)?;
            if listing.is_empty() {
                println!("No backups");
            } else {
                print!("{}", listing);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let correlation_id = uuid::Uuid::new_v4().to_string();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = root_span.enter();
    debug!("CLI arguments: {:?}", args);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_recoverable() => {
            eprintln!("{}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
