//! Display strings for the task list.
//!
//! Joined strings are for rendering only. Stores persist structured records
//! and never rebuild state from these lines.

use crate::error::{Result, TaskError};
use crate::task::{Task, TaskDraft, TaskId};

pub const SEPARATOR: &str = " - ";

pub fn to_display_string(task: &Task) -> String {
    task.fields().join(SEPARATOR)
}

/// Fails when a field itself contains [`SEPARATOR`].
pub fn from_display_string(text: &str) -> Result<TaskDraft> {
    let parts: Vec<&str> = text.split(SEPARATOR).collect();
    match parts.as_slice() {
        [name, date, description, priority] => {
            Ok(TaskDraft::new(*name, *date, *description, *priority))
        }
        _ => Err(TaskError::MalformedDisplay { parts: parts.len() }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub id: TaskId,
    pub done: bool,
    pub text: String,
}

impl From<&Task> for DisplayRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            done: task.done,
            text: to_display_string(task),
        }
    }
}

pub fn rows(tasks: &[Task]) -> Vec<DisplayRow> {
    tasks.iter().map(DisplayRow::from).collect()
}
