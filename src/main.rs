use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use tasklist::config::{Backend, Config, CONFIG_FILE};
use tasklist::display::to_display_string;
use tasklist::logging::{self, LogTarget};
use tasklist::ui::{self, App};
use tasklist::{NameMatch, TaskDraft, TaskError, TaskFilter, TaskId, TaskStore};

/// Personal task list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend (overrides config)
    #[arg(long, value_enum, global = true)]
    backend: Option<Backend>,

    /// Path to the task database or JSON file (overrides config)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    log: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default configuration file
    Init,

    /// Add a new task
    Add {
        name: String,
        description: String,
        /// Task priority (Basse, Moyenne, Haute, or any text)
        #[arg(short, long)]
        priority: String,
        /// Due date, today when omitted
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List tasks
    List {
        /// Only tasks with exactly this priority
        #[arg(short, long)]
        priority: Option<String>,
        /// Case-insensitive keyword matched against every field
        #[arg(long)]
        search: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Delete a task
    Delete(Target),

    /// Mark a task as done
    Done(Target),

    /// Show task counts
    Stats,

    /// Open the interactive list (default)
    Tui,
}

/// Which task(s) an action applies to.
#[derive(Args, Debug)]
struct Target {
    /// Task id
    id: Option<TaskId>,

    /// Match by task name instead of id
    #[arg(long, conflicts_with = "id")]
    name: Option<String>,

    /// With --name, act on every task with that name instead of the oldest
    #[arg(long, requires = "name")]
    all: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let fullscreen = matches!(cli.command, None | Some(Command::Tui));
    let mut target = LogTarget::parse(&cli.log);
    if fullscreen {
        target = target.for_fullscreen();
    }
    logging::init(&target, cli.verbose)?;

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    if let Some(Command::Init) = cli.command {
        if Config::init(&config_path)? {
            println!("Tasklist initialized in {}", config_path.display());
        } else {
            println!("Tasklist already initialized: {}", config_path.display());
        }
        return Ok(());
    }

    let mut config = Config::load(&config_path)?;
    if let Some(backend) = cli.backend {
        if backend != config.storage.backend && cli.store.is_none() {
            config.storage.path = None;
        }
        config.storage.backend = backend;
    }
    if let Some(store) = cli.store {
        config.storage.path = Some(store);
    }
    let mut store = config.open_store()?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Init => unreachable!("handled above"),
        Command::Add {
            name,
            description,
            priority,
            date,
        } => {
            let date = date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
            let task = store.create(TaskDraft::new(name, date, description, priority))?;
            println!("Added [#{}] {}", task.id, to_display_string(&task));
        }
        Command::List {
            priority,
            search,
            json,
        } => {
            let filter = TaskFilter {
                priority,
                keyword: search,
            };
            let tasks = store.list(&filter)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                for task in &tasks {
                    let mark = if task.done { "x" } else { " " };
                    println!("[#{}] [{}] {}", task.id, mark, to_display_string(task));
                }
            }
        }
        Command::Delete(target) => {
            let affected = apply(
                store.as_mut(),
                target,
                |s, id| s.delete(id),
                |s, name, which| s.delete_by_name(name, which),
            )?;
            println!("Deleted {} task(s)", affected);
        }
        Command::Done(target) => {
            let affected = apply(
                store.as_mut(),
                target,
                |s, id| s.mark_done(id),
                |s, name, which| s.mark_done_by_name(name, which),
            )?;
            println!("Marked {} task(s) done", affected);
        }
        Command::Stats => {
            let stats = store.count()?;
            println!("Total tasks: {}", stats.total);
            println!("Done: {}", stats.done);
            println!("Not done: {}", stats.not_done);
        }
        Command::Tui => {
            let palette = config.theme.palette();
            let mut app = App::new(store, config.placeholders.clone())?;
            run_tui(&mut app, &palette)?;
        }
    }
    Ok(())
}

/// Runs an id-based or name-based action and reports "not found" as an error.
fn apply(
    store: &mut dyn TaskStore,
    target: Target,
    by_id: impl FnOnce(&mut dyn TaskStore, TaskId) -> tasklist::Result<bool>,
    by_name: impl FnOnce(&mut dyn TaskStore, &str, NameMatch) -> tasklist::Result<usize>,
) -> Result<usize> {
    match (target.id, target.name) {
        (Some(id), _) => {
            if by_id(store, id)? {
                Ok(1)
            } else {
                Err(TaskError::NotFound(id).into())
            }
        }
        (None, Some(name)) => {
            let which = if target.all {
                NameMatch::All
            } else {
                NameMatch::First
            };
            let affected = by_name(store, &name, which)?;
            if affected == 0 {
                bail!("no task named {:?}", name);
            }
            Ok(affected)
        }
        (None, None) => Err(TaskError::NothingSelected.into()),
    }
}

fn run_tui(app: &mut App, palette: &tasklist::theme::Palette) -> Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("Starting interactive shell");
    let result = ui::run_app(&mut terminal, app, palette);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}
