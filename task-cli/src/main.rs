use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use task_cli::config::{Config, Overrides};
use task_cli::store::parse_filter;
use task_cli::task::timestamp;
use task_cli::{Task, TaskStore, TaskStoreError};
use tracing::Level;

/// Track your tasks from the command line
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Task file to use (defaults to tasks.json in the working directory)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Do not take a lock on the task file
    #[arg(long, global = true)]
    no_lock: bool,

    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task description
        description: String,
    },
    /// Update an existing task
    Update {
        /// Task ID
        id: u32,
        /// New task description
        description: String,
    },
    /// Delete a task by ID
    Delete {
        /// Task ID
        id: u32,
    },
    /// List tasks, optionally only those with a given status
    List {
        /// One of todo, in-progress or done
        filter: Option<String>,
        /// Show IDs, status and timestamps
        #[arg(short, long)]
        long: bool,
    },
    /// Mark a task as 'in-progress'
    MarkInProgress {
        /// Task ID
        id: u32,
    },
    /// Mark a task as 'done'
    MarkDone {
        /// Task ID
        id: u32,
    },
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(&Overrides {
        file: args.file,
        no_lock: args.no_lock,
    })?;
    let store = TaskStore::new(config.store_options());

    let outcome = match args.command {
        Commands::Add { description } => store
            .add(description)
            .map(|task| println!("Task added successfully (ID: {})", task.id())),
        Commands::Update { id, description } => store
            .update(id, description)
            .map(|_| println!("Task {id} updated.")),
        Commands::Delete { id } => store.delete(id).map(|_| println!("Task {id} deleted.")),
        Commands::List { filter, long } => return Ok(list(&store, filter.as_deref(), long)),
        Commands::MarkInProgress { id } => store.mark_in_progress(id).map(print_marked),
        Commands::MarkDone { id } => store.mark_done(id).map(print_marked),
    };

    Ok(match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    })
}

fn list(store: &TaskStore, filter: Option<&str>, long: bool) -> ExitCode {
    let lines = if long {
        parse_filter(filter)
            .and_then(|status| store.list_tasks(status))
            .map(|tasks| tasks.iter().map(long_line).collect())
    } else {
        store.list(filter)
    };

    match lines {
        Ok(lines) => {
            print_list(&lines);
            ExitCode::SUCCESS
        }
        Err(e @ TaskStoreError::MissingStore(_)) => {
            eprintln!("Error: {e}");
            print_list(&[]);
            ExitCode::SUCCESS
        }
        Err(e @ TaskStoreError::ParseError { .. }) => {
            let code = report(&e);
            print_list(&[]);
            code
        }
        Err(e) => report(&e),
    }
}

fn print_list(lines: &[String]) {
    if lines.is_empty() {
        println!("No tasks found.");
        return;
    }
    println!("Here are your tasks:");
    for line in lines {
        println!("- {line}");
    }
}

fn long_line(task: &Task) -> String {
    format!(
        "[{}] {} {} (created {}, updated {})",
        task.id(),
        task.status(),
        task.description(),
        task.created_at().format(timestamp::FORMAT),
        task.updated_at().format(timestamp::FORMAT),
    )
}

fn print_marked(task: Task) {
    println!("Task {} marked as {}.", task.id(), task.status());
}

fn report(error: &TaskStoreError) -> ExitCode {
    eprintln!("Error: {error}");
    ExitCode::FAILURE
}
