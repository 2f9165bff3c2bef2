//! Command definitions and dispatch onto the root view.
//!
//! # Responsibility
//! - Describe the command surface (clap derive).
//! - Execute one command against the collection and return printable text.

use clap::{Args, Subcommand};
use tasklist_core::{ItemCommit, ListFilter, ListView, TaskCollection, TaskRepository, ViewResult};

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create a task (blank titles are ignored).
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Show the list, optionally filtered.
    List(ListArgs),
    /// Flip completion of the task at a position.
    Toggle { position: usize },
    /// Replace a title; an empty title deletes the task.
    Edit {
        position: usize,
        #[arg(num_args = 0..)]
        title: Vec<String>,
    },
    /// Delete the task at a position.
    Rm { position: usize },
    /// Delete every completed task.
    ClearCompleted,
    /// Print done/remaining counts.
    Stats,
    /// Read commands from stdin; a bare line adds a task.
    Shell,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ListArgs {
    /// Only completed tasks.
    #[arg(long, conflicts_with = "remaining")]
    pub done: bool,
    /// Only open tasks.
    #[arg(long)]
    pub remaining: bool,
}

impl ListArgs {
    fn filter(&self) -> ListFilter {
        if self.done {
            ListFilter::Done
        } else if self.remaining {
            ListFilter::Remaining
        } else {
            ListFilter::All
        }
    }
}

/// Command words recognized inside the shell.
pub const SHELL_COMMANDS: &[&str] = &[
    "add",
    "list",
    "toggle",
    "edit",
    "rm",
    "clear-completed",
    "stats",
];

/// Executes one non-shell command and returns the text to print.
pub fn execute<R: TaskRepository>(
    collection: &mut TaskCollection<R>,
    view: &mut ListView,
    command: &Command,
) -> ViewResult<String> {
    let output = match command {
        Command::Add { title } => match view.create_on_enter(collection, &title.join(" "))? {
            Some(task) => format!("added #{} ({})", view_position(view, &task.id), task.title),
            None => "nothing to add".to_string(),
        },
        Command::List(args) => view.render_filtered(args.filter()),
        Command::Toggle { position } => {
            let task = view.toggle_at(collection, *position)?;
            let state = if task.done { "done" } else { "open" };
            format!("#{position} is now {state}")
        }
        Command::Edit { position, title } => {
            match view.edit_at(collection, *position, &title.join(" "))? {
                ItemCommit::Saved(task) => format!("#{position} renamed to {}", task.title),
                ItemCommit::Destroyed(task) => format!("deleted {}", task.title),
                ItemCommit::Unchanged => "nothing changed".to_string(),
            }
        }
        Command::Rm { position } => {
            let task = view.destroy_at(collection, *position)?;
            format!("deleted {}", task.title)
        }
        Command::ClearCompleted => {
            let removed = view.clear_completed(collection);
            format!("cleared {} completed task(s)", removed.len())
        }
        Command::Stats => {
            let stats = view.stats();
            format!(
                "total={} done={} remaining={}",
                stats.total, stats.done, stats.remaining
            )
        }
        Command::Shell => String::new(),
    };
    Ok(output)
}

fn view_position(view: &ListView, id: &tasklist_core::TaskId) -> usize {
    view.items()
        .iter()
        .position(|item| item.task_id() == *id)
        .map_or(0, |index| index + 1)
}
