//! Full-screen terminal shell over a [`TaskStore`].

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};
use std::io::{self, Write};

use crate::display::{self, DisplayRow};
use crate::error::{Result, TaskError};
use crate::store::TaskStore;
use crate::task::{Placeholders, Stats, Task, TaskDraft, TaskFilter, TaskId, KNOWN_PRIORITIES};
use crate::theme::Palette;

/// Shell state: the store, the rows currently shown, and the selection.
pub struct App {
    store: Box<dyn TaskStore>,
    placeholders: Placeholders,
    filter: TaskFilter,
    rows: Vec<DisplayRow>,
    selected: Option<usize>,
    status: String,
}

impl App {
    pub fn new(store: Box<dyn TaskStore>, placeholders: Placeholders) -> Result<Self> {
        let mut app = Self {
            store,
            placeholders,
            filter: TaskFilter::all(),
            rows: Vec::new(),
            selected: None,
            status: String::new(),
        };
        app.refresh()?;
        Ok(app)
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn refresh(&mut self) -> Result<()> {
        let tasks = self.store.list(&self.filter)?;
        self.rows = display::rows(&tasks);
        self.selected = match self.selected {
            _ if self.rows.is_empty() => None,
            Some(i) => Some(i.min(self.rows.len() - 1)),
            None => Some(0),
        };
        Ok(())
    }

    pub fn select_next(&mut self) {
        if let Some(i) = self.selected {
            if i + 1 < self.rows.len() {
                self.selected = Some(i + 1);
            }
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(i) = self.selected {
            self.selected = Some(i.saturating_sub(1));
        }
    }

    fn selected_id(&self) -> Result<TaskId> {
        self.selected
            .and_then(|i| self.rows.get(i))
            .map(|row| row.id)
            .ok_or(TaskError::NothingSelected)
    }

    pub fn add(&mut self, draft: TaskDraft) -> Result<Task> {
        let task = self.store.create(draft)?;
        self.refresh()?;
        Ok(task)
    }

    pub fn delete_selected(&mut self) -> Result<TaskId> {
        let id = self.selected_id()?;
        if !self.store.delete(id)? {
            return Err(TaskError::NotFound(id));
        }
        self.refresh()?;
        Ok(id)
    }

    pub fn mark_selected_done(&mut self) -> Result<TaskId> {
        let id = self.selected_id()?;
        if !self.store.mark_done(id)? {
            return Err(TaskError::NotFound(id));
        }
        self.refresh()?;
        Ok(id)
    }

    pub fn stats(&self) -> Result<Stats> {
        self.store.count()
    }

    pub fn set_filter(&mut self, filter: TaskFilter) -> Result<()> {
        self.filter = filter;
        self.selected = None;
        self.refresh()
    }

    /// Shows the outcome of an action on the status line.
    fn report(&mut self, outcome: Result<String>) {
        self.status = match outcome {
            Ok(message) => message,
            Err(TaskError::IncompleteEntry { field }) => {
                format!("Incomplete entry: please fill in the {} field", field)
            }
            Err(TaskError::NothingSelected) => "Nothing selected: pick a task first".to_string(),
            Err(err) => format!("Error: {}", err),
        };
    }

    fn title(&self) -> String {
        match (&self.filter.priority, &self.filter.keyword) {
            (None, None) => "Tasks".to_string(),
            (Some(p), None) => format!("Tasks [priority = {}]", p),
            (None, Some(k)) => format!("Tasks [search: {}]", k),
            (Some(p), Some(k)) => format!("Tasks [priority = {}, search: {}]", p, k),
        }
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    palette: &Palette,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![Constraint::Min(3), Constraint::Length(3)])
                .split(f.area());

            let items: Vec<ListItem> = app
                .rows
                .iter()
                .map(|row| {
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("[#{}] ", row.id)),
                        Span::raw(if row.done { "[x] " } else { "[ ] " }),
                        Span::styled(row.text.as_str(), palette.row(row.done)),
                    ]))
                })
                .collect();

            let list = List::new(items)
                .block(
                    Block::default()
                        .title(app.title())
                        .borders(Borders::ALL)
                        .border_style(palette.block()),
                )
                .highlight_style(palette.selected());

            let mut state = ListState::default();
            state.select(app.selected);
            f.render_stateful_widget(list, chunks[0], &mut state);

            let help = "a add  d delete  x done  s stats  / search  p priority  c clear  q quit";
            let status = if app.status.is_empty() { help } else { app.status.as_str() };
            let footer = Paragraph::new(Span::styled(status, palette.block().fg(palette.status)))
                .block(Block::default().borders(Borders::ALL).border_style(palette.block()));
            f.render_widget(footer, chunks[1]);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('a') => {
                    let fields = prompt_fields(&app.placeholders)?;
                    terminal.clear()?;
                    if let Some(draft) = fields {
                        let outcome = app.add(draft).map(|t| format!("Added #{}", t.id));
                        app.report(outcome);
                    }
                }
                KeyCode::Char('d') | KeyCode::Delete => {
                    let outcome = app.delete_selected().map(|id| format!("Deleted #{}", id));
                    app.report(outcome);
                }
                KeyCode::Char('x') | KeyCode::Enter => {
                    let outcome = app.mark_selected_done().map(|id| format!("Done #{}", id));
                    app.report(outcome);
                }
                KeyCode::Char('s') => {
                    let outcome = app.stats().map(|s| {
                        format!("Total: {}  Done: {}  Not done: {}", s.total, s.done, s.not_done)
                    });
                    app.report(outcome);
                }
                KeyCode::Char('/') => {
                    let keyword = prompt("Search keyword")?;
                    terminal.clear()?;
                    if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
                        let filter = TaskFilter {
                            keyword: Some(keyword),
                            ..app.filter.clone()
                        };
                        let outcome = app.set_filter(filter).map(|_| String::new());
                        app.report(outcome);
                    }
                }
                KeyCode::Char('p') => {
                    let question = format!("Priority ({})", KNOWN_PRIORITIES.join(", "));
                    let priority = prompt(&question)?;
                    terminal.clear()?;
                    if let Some(priority) = priority.filter(|p| !p.is_empty()) {
                        let filter = TaskFilter {
                            priority: Some(priority),
                            ..app.filter.clone()
                        };
                        let outcome = app.set_filter(filter).map(|_| String::new());
                        app.report(outcome);
                    }
                }
                KeyCode::Char('c') => {
                    let outcome = app.set_filter(TaskFilter::all()).map(|_| String::new());
                    app.report(outcome);
                }
                KeyCode::Up => app.select_previous(),
                KeyCode::Down => app.select_next(),
                _ => {}
            }
        }
    }
}

/// Asks for the four entry fields. `None` when input was abandoned.
fn prompt_fields(placeholders: &Placeholders) -> io::Result<Option<TaskDraft>> {
    let mut values = Vec::with_capacity(4);
    for placeholder in placeholders.as_array() {
        match prompt(placeholder)? {
            Some(value) => values.push(value),
            None => return Ok(None),
        }
    }
    let [name, date, description, priority]: [String; 4] = match values.try_into() {
        Ok(fields) => fields,
        Err(_) => return Ok(None),
    };
    Ok(Some(TaskDraft::new(name, date, description, priority)))
}

fn prompt(message: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;
    print!("{} ", message);
    stdout.flush()?;
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input);
    execute!(stdout, EnterAlternateScreen)?;
    enable_raw_mode()?;
    match read {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(input.trim().to_string())),
        Err(err) => Err(err),
    }
}
