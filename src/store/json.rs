//! JSON document store.
//!
//! The file holds `{"last_id": N, "tasks": [...]}`, each task keyed by the
//! French labels of the entry form. `last_id` is the highest id ever issued,
//! so ids of deleted tasks are not handed out again after a reopen.
//!
//! Older files are a bare array carrying only the four text keys; ids and the
//! done flag are filled in on load and the full document is written back on
//! the next save.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::TaskStore;
use crate::error::{Result, TaskError};
use crate::task::{Placeholders, Stats, Task, TaskDraft, TaskFilter, TaskId};

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<TaskId>,
    #[serde(rename = "Tâche")]
    name: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Priorité")]
    priority: String,
    #[serde(rename = "Fait", default)]
    done: bool,
}

impl From<&Task> for Record {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            name: task.name.clone(),
            date: task.date.clone(),
            description: task.description.clone(),
            priority: task.priority.clone(),
            done: task.done,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Current {
        #[serde(default)]
        last_id: Option<TaskId>,
        tasks: Vec<Value>,
    },
    Legacy(Vec<Value>),
}

#[derive(Serialize)]
struct DocumentOut {
    last_id: TaskId,
    tasks: Vec<Value>,
}

#[derive(Debug, Default)]
struct Loaded {
    tasks: Vec<Task>,
    last_id: TaskId,
    skipped: Vec<Value>,
}

#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    tasks: Vec<Task>,
    last_id: TaskId,
    // Entries that did not read as tasks; written back untouched.
    skipped: Vec<Value>,
    placeholders: Placeholders,
}

impl JsonStore {
    /// Loads the document at `path`. A missing or blank file is an empty list;
    /// anything unparsable is [`TaskError::Corrupt`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let loaded = load_from_file(&path)?;
        info!(path = %path.display(), count = loaded.tasks.len(), "Opened JSON task store");
        Ok(Self {
            path,
            tasks: loaded.tasks,
            last_id: loaded.last_id,
            skipped: loaded.skipped,
            placeholders: Placeholders::default(),
        })
    }

    pub fn with_placeholders(mut self, placeholders: Placeholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of file entries that could not be read as tasks.
    pub fn skipped(&self) -> usize {
        self.skipped.len()
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    /// Rewrites the whole document through a temporary file.
    fn save_to_file(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut tasks = self
            .tasks
            .iter()
            .map(|t| serde_json::to_value(Record::from(t)))
            .collect::<serde_json::Result<Vec<_>>>()?;
        tasks.extend(self.skipped.iter().cloned());
        let document = DocumentOut {
            last_id: self.last_id,
            tasks,
        };
        let body = serde_json::to_string_pretty(&document)?;

        let tmp = self.tmp_path();
        if let Err(err) = fs::write(&tmp, body).and_then(|_| fs::rename(&tmp, &self.path)) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                debug!(path = %tmp.display(), error = %cleanup, "Could not remove temporary file");
            }
            return Err(err.into());
        }
        debug!(path = %self.path.display(), count = self.tasks.len(), "Saved tasks");
        Ok(())
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}

fn load_from_file(path: &Path) -> Result<Loaded> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Loaded::default()),
        Err(err) => return Err(err.into()),
    };
    if data.trim().is_empty() {
        return Ok(Loaded::default());
    }
    let document: Document = serde_json::from_str(&data).map_err(|source| TaskError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    let (stored_last_id, values) = match document {
        Document::Current { last_id, tasks } => (last_id, tasks),
        Document::Legacy(tasks) => (None, tasks),
    };

    let mut records = Vec::with_capacity(values.len());
    let mut skipped = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        match Record::deserialize(&value) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(path = %path.display(), index, error = %err, "Skipping unreadable task entry");
                skipped.push(value);
            }
        }
    }

    let mut last_id = records
        .iter()
        .filter_map(|r| r.id)
        .chain(stored_last_id)
        .fold(0, TaskId::max);
    let mut seen = HashSet::new();
    let mut assigned = 0;
    let mut tasks = Vec::with_capacity(records.len());
    for record in records {
        let id = match record.id {
            Some(id) if seen.insert(id) => id,
            _ => {
                last_id = last_id.checked_add(1).ok_or(TaskError::IdsExhausted)?;
                seen.insert(last_id);
                assigned += 1;
                last_id
            }
        };
        tasks.push(Task {
            id,
            name: record.name,
            date: record.date,
            description: record.description,
            priority: record.priority,
            done: record.done,
        });
    }
    if assigned > 0 {
        warn!(path = %path.display(), assigned, "Assigned ids to tasks without a unique id");
    }
    Ok(Loaded {
        tasks,
        last_id,
        skipped,
    })
}

impl TaskStore for JsonStore {
    fn create(&mut self, draft: TaskDraft) -> Result<Task> {
        let draft = draft.validate(&self.placeholders)?;
        let id = self.last_id.checked_add(1).ok_or(TaskError::IdsExhausted)?;
        let task = draft.into_task(id);

        let previous_last_id = self.last_id;
        self.last_id = id;
        self.tasks.push(task.clone());
        if let Err(err) = self.save_to_file() {
            self.tasks.pop();
            self.last_id = previous_last_id;
            return Err(err);
        }
        debug!(id = task.id, name = %task.name, "Created task");
        Ok(task)
    }

    fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.position(id).map(|i| self.tasks[i].clone()))
    }

    fn delete(&mut self, id: TaskId) -> Result<bool> {
        let Some(index) = self.position(id) else {
            debug!(id, "Delete found no task");
            return Ok(false);
        };
        let removed = self.tasks.remove(index);
        if let Err(err) = self.save_to_file() {
            self.tasks.insert(index, removed);
            return Err(err);
        }
        debug!(id, "Deleted task");
        Ok(true)
    }

    fn mark_done(&mut self, id: TaskId) -> Result<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        if self.tasks[index].done {
            return Ok(true);
        }
        self.tasks[index].done = true;
        if let Err(err) = self.save_to_file() {
            self.tasks[index].done = false;
            return Err(err);
        }
        debug!(id, "Marked task done");
        Ok(true)
    }

    fn count(&self) -> Result<Stats> {
        Ok(Stats::from_tasks(&self.tasks))
    }
}
