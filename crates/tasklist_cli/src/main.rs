//! tasklist command-line front end.
//!
//! # Responsibility
//! - Compose config, logging, storage, collection and root view.
//! - Run one command, or an interactive shell over stdin.
//!
//! # Invariants
//! - Storage problems never abort a session; they degrade to the in-memory
//!   backend and are reported as warnings.

mod commands;
mod storage;

use clap::Parser;
use commands::{execute, Command, ListArgs, SHELL_COMMANDS};
use log::{debug, info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use storage::Storage;
use tasklist_core::{init_logging, AppConfig, ListView, TaskCollection, TaskRepository};

#[derive(Debug, Parser)]
#[command(name = "tasklist", version, about = "Keep an ordered list of tasks")]
struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Database file, overriding the config value.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Storage namespace, overriding the config value.
    #[arg(long, global = true)]
    namespace: Option<String>,
    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    fn resolve_config(&self) -> tasklist_core::ConfigResult<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        tasklist_core::core_version()
    );

    let storage = Storage::open(&config);
    let mut collection = TaskCollection::fetch(storage.repository());
    let mut view = ListView::new(&mut collection);
    for warning in storage.warnings() {
        eprintln!("warning: {warning}");
    }

    let command = cli.command.unwrap_or(Command::List(ListArgs::default()));
    let status = match command {
        Command::Shell => run_shell(&mut collection, &mut view),
        other => run_once(&mut collection, &mut view, &other),
    };
    print_warnings(&mut view);
    status
}

fn run_once<R: TaskRepository>(
    collection: &mut TaskCollection<R>,
    view: &mut ListView,
    command: &Command,
) -> ExitCode {
    match execute(collection, view, command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_shell<R: TaskRepository>(
    collection: &mut TaskCollection<R>,
    view: &mut ListView,
) -> ExitCode {
    println!("{}", view.render());
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                warn!("event=shell_read module=cli status=error error={err}");
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }

        let line = line.trim();
        if matches!(line, "quit" | "exit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let command = parse_shell_line(line);
        match execute(collection, view, &command) {
            Ok(output) if !output.is_empty() => println!("{output}"),
            Ok(_) => {}
            Err(err) => eprintln!("error: {err}"),
        }
        print_warnings(view);
    }
    ExitCode::SUCCESS
}

#[derive(Debug, Parser)]
#[command(name = "shell", no_binary_name = true, disable_help_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

/// Lines that parse as a command are commands; anything else, including
/// titles that merely start with a command word, is a new task title.
fn parse_shell_line(line: &str) -> Command {
    let first = line.split_whitespace().next().unwrap_or_default();
    if SHELL_COMMANDS.contains(&first) {
        match ShellLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => return parsed.command,
            Err(err) => debug!(
                "event=shell_parse module=cli status=fallback kind={:?}",
                err.kind()
            ),
        }
    }
    Command::Add {
        title: vec![line.to_string()],
    }
}

fn print_warnings(view: &mut ListView) {
    for warning in view.take_warnings() {
        eprintln!("warning: {warning}");
    }
}
