use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

use crate::actions::{self, Notification, Notifier};
use crate::config::Config;
use crate::models::{Priority, Task, TaskDraft, TaskId, ValidationError, parse_due_date};
use crate::persistence::KeyValueStore;
use crate::pipeline::{self, Filter};
use crate::store::TaskStore;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "A small task manager with search, filters and priorities")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add a new task
    Add {
        /// Task title
        title: String,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD), defaults to tomorrow
        #[arg(long)]
        due: Option<String>,
        /// high, medium or low
        #[arg(short, long)]
        priority: Option<String>,
    },
    /// List tasks in display order
    List {
        /// all, open, completed, high, medium or low
        #[arg(short, long)]
        filter: Option<String>,
        /// Case-insensitive text to look for in titles and descriptions
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Change fields of an existing task
    Edit {
        /// Task id or a unique prefix of it
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
    },
    /// Mark a task completed, or reopen it
    Toggle {
        /// Task id or a unique prefix of it
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task id or a unique prefix of it
        id: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("No task matches '{0}'")]
    UnknownTask(String),
    #[error("'{prefix}' matches {count} tasks, use a longer prefix")]
    AmbiguousTask { prefix: String, count: usize },
    #[error("{0}")]
    Parse(String),
}

/// Prints notifications to stdout
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&mut self, notification: Notification) {
        println!("{}: {}", notification.title, notification.description);
    }
}

/// Resolve a full id or a unique id prefix
pub fn resolve_id<K: KeyValueStore>(store: &TaskStore<K>, input: &str) -> Result<TaskId, CliError> {
    if let Ok(id) = input.trim().parse::<TaskId>()
        && store.get(&id).is_some()
    {
        return Ok(id);
    }
    match store.find_by_prefix(input).as_slice() {
        [] => Err(CliError::UnknownTask(input.to_string())),
        [task] => Ok(task.id),
        many => Err(CliError::AmbiguousTask {
            prefix: input.to_string(),
            count: many.len(),
        }),
    }
}

fn parse_priority(input: Option<&str>, default: Priority) -> Result<Priority, CliError> {
    input.map_or(Ok(default), |p| p.parse().map_err(CliError::Parse))
}

/// Handle the add command
#[allow(clippy::too_many_arguments)]
pub fn handle_add<K, N>(
    store: &mut TaskStore<K>,
    title: String,
    description: Option<String>,
    due: Option<String>,
    priority: Option<String>,
    default_priority: Priority,
    today: NaiveDate,
    notifier: &mut N,
) -> Result<TaskId, CliError>
where
    K: KeyValueStore,
    N: Notifier + ?Sized,
{
    let mut draft = TaskDraft::new(parse_priority(priority.as_deref(), default_priority)?, today);
    draft.title = title;
    draft.description = description.unwrap_or_default();
    if let Some(due) = due {
        draft.due_date = parse_due_date(&due)?;
    }
    Ok(actions::create_task(store, &draft, notifier)?)
}

/// Handle the edit command. Fields left out keep their current value.
pub fn handle_edit<K, N>(
    store: &mut TaskStore<K>,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    priority: Option<String>,
    notifier: &mut N,
) -> Result<TaskId, CliError>
where
    K: KeyValueStore,
    N: Notifier + ?Sized,
{
    let id = resolve_id(store, id)?;
    let task = store.get(&id).ok_or_else(|| CliError::UnknownTask(id.to_string()))?;
    let mut draft = TaskDraft::from_task(task);
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(description) = description {
        draft.description = description;
    }
    if let Some(due) = due {
        draft.due_date = parse_due_date(&due)?;
    }
    draft.priority = parse_priority(priority.as_deref(), draft.priority)?;

    actions::update_task(store, &id, &draft, notifier)?;
    Ok(id)
}

pub fn handle_toggle<K, N>(store: &mut TaskStore<K>, id: &str, notifier: &mut N) -> Result<TaskId, CliError>
where
    K: KeyValueStore,
    N: Notifier + ?Sized,
{
    let id = resolve_id(store, id)?;
    actions::toggle_complete(store, &id, notifier);
    Ok(id)
}

pub fn handle_delete<K, N>(store: &mut TaskStore<K>, id: &str, notifier: &mut N) -> Result<TaskId, CliError>
where
    K: KeyValueStore,
    N: Notifier + ?Sized,
{
    let id = resolve_id(store, id)?;
    actions::delete_task(store, &id, notifier);
    Ok(id)
}

/// One line per task: short id, status box, priority, title, due label
pub fn format_task_line(task: &Task, today: NaiveDate) -> String {
    let check = if task.is_completed() { "x" } else { " " };
    format!(
        "{}  [{}] {:<6}  {}  ({})",
        task.id.short(),
        check,
        task.priority.as_str(),
        task.title,
        task.due_label(today)
    )
}

/// Handle the list command, returning the lines to print
pub fn handle_list<K: KeyValueStore>(
    store: &TaskStore<K>,
    filter: Option<String>,
    search: Option<String>,
    default_filter: Filter,
    today: NaiveDate,
) -> Result<Vec<String>, CliError> {
    let filter = match filter {
        Some(f) => f.parse::<Filter>().map_err(CliError::Parse)?,
        None => default_filter,
    };
    let query = search.unwrap_or_default();
    let tasks = pipeline::derive(store.tasks(), &query, filter);

    let mut lines: Vec<String> = tasks.iter().map(|t| format_task_line(t, today)).collect();
    if tasks.is_empty() && !store.is_empty() {
        lines.push("No tasks match.".to_string());
    }
    lines.push(store.counts().summary());
    Ok(lines)
}

/// Run a non-interactive subcommand
pub fn dispatch<K: KeyValueStore>(
    command: Commands,
    store: &mut TaskStore<K>,
    config: &Config,
    today: NaiveDate,
) -> Result<(), CliError> {
    let mut notifier = StdoutNotifier;
    match command {
        // The binary starts the terminal UI itself
        Commands::Tui => {}
        Commands::Add { title, description, due, priority } => {
            handle_add(store, title, description, due, priority, config.default_priority, today, &mut notifier)?;
        }
        Commands::List { filter, search } => {
            for line in handle_list(store, filter, search, config.default_filter, today)? {
                println!("{}", line);
            }
        }
        Commands::Edit { id, title, description, due, priority } => {
            handle_edit(store, &id, title, description, due, priority, &mut notifier)?;
        }
        Commands::Toggle { id } => {
            handle_toggle(store, &id, &mut notifier)?;
        }
        Commands::Delete { id } => {
            handle_delete(store, &id, &mut notifier)?;
        }
    }
    Ok(())
}
