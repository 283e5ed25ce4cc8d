//! Durable task storage.
//!
//! Two backends share the [`TaskStore`] contract: an SQLite table and a JSON
//! document. Both assign ids, keep creation order, and write through on every
//! mutation.

pub mod json;
pub mod sqlite;

use crate::error::Result;
use crate::task::{NameMatch, Stats, Task, TaskDraft, TaskFilter, TaskId};

pub use json::JsonStore;
pub use sqlite::SqliteStore;

pub trait TaskStore {
    /// Validates and persists a new task. Nothing is written on failure.
    fn create(&mut self, draft: TaskDraft) -> Result<Task>;

    fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    fn get(&self, id: TaskId) -> Result<Option<Task>>;

    fn delete(&mut self, id: TaskId) -> Result<bool>;

    fn mark_done(&mut self, id: TaskId) -> Result<bool>;

    fn count(&self) -> Result<Stats>;

    fn delete_by_name(&mut self, name: &str, which: NameMatch) -> Result<usize> {
        let mut removed = 0;
        for id in ids_named(&*self, name, which)? {
            if self.delete(id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn mark_done_by_name(&mut self, name: &str, which: NameMatch) -> Result<usize> {
        let mut marked = 0;
        for id in ids_named(&*self, name, which)? {
            if self.mark_done(id)? {
                marked += 1;
            }
        }
        Ok(marked)
    }
}

fn ids_named<S: TaskStore + ?Sized>(store: &S, name: &str, which: NameMatch) -> Result<Vec<TaskId>> {
    let ids = store
        .list(&TaskFilter::all())?
        .into_iter()
        .filter(|t| t.name == name)
        .map(|t| t.id);
    Ok(match which {
        NameMatch::First => ids.take(1).collect(),
        NameMatch::All => ids.collect(),
    })
}
