use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskError};

pub type TaskId = i64;

/// Priorities offered by the entry form. Priority itself stays free text.
pub const KNOWN_PRIORITIES: [&str; 3] = ["Basse", "Moyenne", "Haute"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub date: String,
    pub description: String,
    pub priority: String,
    pub done: bool,
}

impl Task {
    pub fn fields(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.date.as_str(),
            self.description.as_str(),
            self.priority.as_str(),
        ]
    }

    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            name: self.name.clone(),
            date: self.date.clone(),
            description: self.description.clone(),
            priority: self.priority.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub name: String,
    pub date: String,
    pub description: String,
    pub priority: String,
}

impl TaskDraft {
    pub fn new(
        name: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
        priority: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            description: description.into(),
            priority: priority.into(),
        }
    }

    /// Trims every field and rejects empty or placeholder values.
    pub fn validate(&self, placeholders: &Placeholders) -> Result<TaskDraft> {
        let checked = TaskDraft::new(
            self.name.trim(),
            self.date.trim(),
            self.description.trim(),
            self.priority.trim(),
        );
        let pairs = [
            ("name", &checked.name, &placeholders.name),
            ("date", &checked.date, &placeholders.date),
            ("description", &checked.description, &placeholders.description),
            ("priority", &checked.priority, &placeholders.priority),
        ];
        for (field, value, placeholder) in pairs {
            if value.is_empty() || value == placeholder.trim() {
                return Err(TaskError::IncompleteEntry { field });
            }
        }
        Ok(checked)
    }

    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            name: self.name,
            date: self.date,
            description: self.description,
            priority: self.priority,
            done: false,
        }
    }
}

/// Prompt text shown in an empty input field. A value equal to its
/// placeholder counts as "nothing entered".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Placeholders {
    pub name: String,
    pub date: String,
    pub description: String,
    pub priority: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            name: "Tâche...".to_string(),
            date: "Date...".to_string(),
            description: "Description...".to_string(),
            priority: "Priorité...".to_string(),
        }
    }
}

impl Placeholders {
    pub fn as_array(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.date.as_str(),
            self.description.as_str(),
            self.priority.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub priority: Option<String>,
    pub keyword: Option<String>,
}

impl TaskFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn priority(priority: impl Into<String>) -> Self {
        Self {
            priority: Some(priority.into()),
            keyword: None,
        }
    }

    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            priority: None,
            keyword: Some(keyword.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.priority.is_none() && self.keyword.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(priority) = &self.priority {
            if task.priority != *priority {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            if !task
                .fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

/// Which of several same-named tasks a name-based operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    First,
    All,
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub done: usize,
    pub not_done: usize,
}

impl Stats {
    pub fn new(total: usize, done: usize) -> Self {
        Self {
            total,
            done,
            not_done: total.saturating_sub(done),
        }
    }

    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let (total, done) = tasks
            .into_iter()
            .fold((0, 0), |(total, done), t| (total + 1, done + t.done as usize));
        Self::new(total, done)
    }
}
