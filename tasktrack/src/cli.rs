use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tasktrack_core::{
    config::Config,
    service::{ListQuery, Outcome, SortKey, TaskService},
    task::{FileTaskRepository, Task, TaskId, TaskStatus},
};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_HASH: &str = env!("CARGO_GIT_SHA");

#[derive(Parser)]
#[command(
    name = "tasktrack",
    version,
    about = "Track short tasks in a flat text file",
    long_about = "tasktrack keeps a list of short tasks in a flat `id|text|status` file.\n\nEach invocation runs one command against the file and exits.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Task file to use (overrides TASKTRACK_FILE and the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a new task
    Add {
        /// Task text
        text: String,
    },

    /// Delete an existing task
    Delete {
        /// Task ID
        id: u64,
    },

    /// Replace the text of an existing task
    Update {
        /// Task ID
        id: u64,
        /// New task text
        text: String,
    },

    /// Mark a task Done
    Done {
        /// Task ID
        id: u64,
    },

    /// Mark a task In Progress
    #[command(name = "inprogress")]
    InProgress {
        /// Task ID
        id: u64,
    },

    /// Change a task's status: `make done <id>` or `make inprogress <id>`
    Make {
        /// Target status
        action: MakeAction,
        /// Task ID
        id: u64,
    },

    /// List tasks: [--pending|--done|--inprogress] [--id|--item]
    List {
        /// Optional filter (--pending, --done, --inprogress) and sort (--id, --item) flags
        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "FLAGS"
        )]
        flags: Vec<String>,
    },

    /// Print version
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MakeAction {
    Done,
    #[value(name = "inprogress")]
    InProgress,
}

pub fn run(cli: Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }
    let mut service = open(cli.file)?;
    let result = execute(&mut service, cli.command);
    // Reported even when the command failed, and regardless of the log filter.
    for skipped in service.skipped() {
        eprintln!("Loading data fail: {skipped}");
    }
    result
}

fn execute(service: &mut TaskService<FileTaskRepository>, command: Commands) -> Result<()> {
    match command {
        Commands::Version => print_version(),
        Commands::Add { text } => report(service.add(&text)?),
        Commands::Delete { id } => report(service.delete(TaskId::new(id))?),
        Commands::Update { id, text } => report(service.update_text(TaskId::new(id), &text)?),
        Commands::Done { id }
        | Commands::Make {
            action: MakeAction::Done,
            id,
        } => report(service.mark_done(TaskId::new(id))?),
        Commands::InProgress { id }
        | Commands::Make {
            action: MakeAction::InProgress,
            id,
        } => report(service.mark_in_progress(TaskId::new(id))?),
        Commands::List { flags } => {
            let (query, unknown) = parse_list_flags(&flags);
            if let Some(flag) = unknown {
                eprintln!("Warning: unknown flag '{flag}', ignoring it and any flags after it");
            }
            let tasks = service.list(query)?;
            print!("{}", format_list(&tasks));
        }
    }
    Ok(())
}

/// Resolve config, start logging, and bind the service to the task file.
fn open(file: Option<PathBuf>) -> Result<TaskService<FileTaskRepository>> {
    let config = Config::load()?.with_tasks_file(file);
    init_tracing(&config);
    tracing::debug!(tasks_file = %config.tasks_file.display(), "using task file");
    Ok(TaskService::new(FileTaskRepository::new(config.tasks_file)))
}

/// Install the stderr subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

fn print_version() {
    println!("tasktrack {VERSION} ({GIT_HASH})");
}

fn report(outcome: Outcome) {
    println!("{outcome}");
}

/// Read `list` flags left to right.
///
/// The last filter flag and the last sort flag win. The first unrecognized
/// flag stops processing; it is returned alongside the query built so far.
pub fn parse_list_flags(flags: &[String]) -> (ListQuery, Option<String>) {
    let mut query = ListQuery::default();
    for flag in flags {
        match flag.as_str() {
            "--pending" => query.status = Some(TaskStatus::Pending),
            "--done" => query.status = Some(TaskStatus::Done),
            "--inprogress" => query.status = Some(TaskStatus::InProgress),
            "--id" => query.sort = Some(SortKey::Id),
            "--item" => query.sort = Some(SortKey::Text),
            other => return (query, Some(other.to_string())),
        }
    }
    (query, None)
}

/// Render the task view framed by header and footer rules.
pub fn format_list(tasks: &[Task]) -> String {
    let mut out = String::from("---View Tasks---\n");
    for task in tasks {
        out.push_str(&format!(
            "{} {} {}{}\n",
            task.id,
            task.text,
            task.status.checkbox(),
            if task.status == TaskStatus::InProgress {
                " <- In Progress"
            } else {
                ""
            }
        ));
    }
    out.push_str("----------------\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn flags(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_add() {
        let cli = parse(&["tasktrack", "add", "write spec"]);
        assert!(matches!(cli.command, Commands::Add { ref text } if text == "write spec"));
    }

    #[test]
    fn parse_update() {
        let cli = parse(&["tasktrack", "update", "3", "new text"]);
        assert!(matches!(cli.command, Commands::Update { id: 3, ref text } if text == "new text"));
    }

    #[test]
    fn parse_inprogress() {
        let cli = parse(&["tasktrack", "inprogress", "2"]);
        assert!(matches!(cli.command, Commands::InProgress { id: 2 }));
    }

    #[test]
    fn parse_make() {
        let cli = parse(&["tasktrack", "make", "done", "4"]);
        assert!(matches!(
            cli.command,
            Commands::Make {
                action: MakeAction::Done,
                id: 4
            }
        ));
        let cli = parse(&["tasktrack", "make", "inprogress", "4"]);
        assert!(matches!(
            cli.command,
            Commands::Make {
                action: MakeAction::InProgress,
                id: 4
            }
        ));
    }

    #[test]
    fn parse_list_collects_flags() {
        let cli = parse(&["tasktrack", "list", "--done", "--id"]);
        match cli.command {
            Commands::List { flags } => assert_eq!(flags, vec!["--done", "--id"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_global_file_flag() {
        let cli = parse(&["tasktrack", "--file", "/tmp/x.txt", "list"]);
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/x.txt")));
    }

    #[test]
    fn rejects_missing_and_bad_arguments() {
        assert!(Cli::try_parse_from(["tasktrack"]).is_err());
        assert!(Cli::try_parse_from(["tasktrack", "delete"]).is_err());
        assert!(Cli::try_parse_from(["tasktrack", "delete", "abc"]).is_err());
        assert!(Cli::try_parse_from(["tasktrack", "update", "1"]).is_err());
        assert!(Cli::try_parse_from(["tasktrack", "frobnicate"]).is_err());
        assert!(Cli::try_parse_from(["tasktrack", "make", "pending", "1"]).is_err());
    }

    #[test]
    fn list_flags_filter_and_sort() {
        let (query, unknown) = parse_list_flags(&flags(&["--done", "--id"]));
        assert_eq!(query.status, Some(TaskStatus::Done));
        assert_eq!(query.sort, Some(SortKey::Id));
        assert!(unknown.is_none());

        let (query, _) = parse_list_flags(&flags(&["--item"]));
        assert_eq!(query.status, None);
        assert_eq!(query.sort, Some(SortKey::Text));

        let (query, _) = parse_list_flags(&flags(&["--pending", "--inprogress"]));
        assert_eq!(query.status, Some(TaskStatus::InProgress));
    }

    #[test]
    fn list_flags_stop_at_unknown() {
        let (query, unknown) = parse_list_flags(&flags(&["--pending", "--bogus", "--id"]));
        assert_eq!(query.status, Some(TaskStatus::Pending));
        assert_eq!(query.sort, None);
        assert_eq!(unknown.as_deref(), Some("--bogus"));
    }

    #[test]
    fn format_list_marks_status() {
        let tasks = vec![
            Task {
                id: TaskId::new(1),
                text: "write spec".to_string(),
                status: TaskStatus::Pending,
            },
            Task {
                id: TaskId::new(2),
                text: "ship it".to_string(),
                status: TaskStatus::InProgress,
            },
            Task {
                id: TaskId::new(3),
                text: "review".to_string(),
                status: TaskStatus::Done,
            },
        ];
        assert_eq!(
            format_list(&tasks),
            "---View Tasks---\n1 write spec [ ]\n2 ship it [ ] <- In Progress\n3 review [x]\n----------------\n"
        );
    }

    #[test]
    fn format_empty_list() {
        assert_eq!(format_list(&[]), "---View Tasks---\n----------------\n");
    }
}
