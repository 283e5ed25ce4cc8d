//! SQLite-backed store: one flat table, auto-increment ids.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use super::TaskStore;
use crate::error::{Result, TaskError};
use crate::task::{Placeholders, Stats, Task, TaskDraft, TaskFilter, TaskId};

pub const DEFAULT_TABLE: &str = "tasks";

pub struct SqliteStore {
    conn: Connection,
    table: String,
    placeholders: Placeholders,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_table(path, DEFAULT_TABLE)
    }

    /// Opens `table` inside the database at `path`, creating or upgrading it.
    pub fn open_table<P: AsRef<Path>>(path: P, table: &str) -> Result<Self> {
        check_table_name(table)?;
        let conn = Connection::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), table, "Opened SQLite task store");
        Self::init(conn, table)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, DEFAULT_TABLE)
    }

    pub fn with_placeholders(mut self, placeholders: Placeholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    fn init(conn: Connection, table: &str) -> Result<Self> {
        let store = Self {
            conn,
            table: table.to_string(),
            placeholders: Placeholders::default(),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task TEXT,
                date TEXT,
                description TEXT,
                priority TEXT,
                done INTEGER NOT NULL DEFAULT 0
            )",
            self.table
        ))?;

        // Tables written before completion tracking have no `done` column.
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", self.table))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        if !columns.iter().any(|c| c == "done") {
            warn!(table = %self.table, "Adding missing done column");
            self.conn.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN done INTEGER NOT NULL DEFAULT 0",
                self.table
            ))?;
        }
        Ok(())
    }

    fn select(&self) -> String {
        format!(
            "SELECT id, COALESCE(task, ''), COALESCE(date, ''), COALESCE(description, ''),
                    COALESCE(priority, ''), done
             FROM {}",
            self.table
        )
    }
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        date: row.get(2)?,
        description: row.get(3)?,
        priority: row.get(4)?,
        done: row.get::<_, i64>(5)? != 0,
    })
}

/// Table names are spliced into SQL, so only plain identifiers pass.
fn check_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(TaskError::InvalidConfig(format!(
            "table name {:?} is not a plain identifier",
            name
        )))
    }
}

impl TaskStore for SqliteStore {
    fn create(&mut self, draft: TaskDraft) -> Result<Task> {
        let draft = draft.validate(&self.placeholders)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (task, date, description, priority, done)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                self.table
            ),
            params![draft.name, draft.date, draft.description, draft.priority],
        )?;
        let task = draft.into_task(self.conn.last_insert_rowid());
        debug!(id = task.id, name = %task.name, "Created task");
        Ok(task)
    }

    fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!("{} ORDER BY id", self.select()))?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks.into_iter().filter(|t| filter.matches(t)).collect())
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", self.select()),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    fn delete(&mut self, id: TaskId) -> Result<bool> {
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", self.table), params![id])?;
        debug!(id, found = changed > 0, "Deleted task");
        Ok(changed > 0)
    }

    fn mark_done(&mut self, id: TaskId) -> Result<bool> {
        let changed = self.conn.execute(
            &format!("UPDATE {} SET done = 1 WHERE id = ?1", self.table),
            params![id],
        )?;
        debug!(id, found = changed > 0, "Marked task done");
        Ok(changed > 0)
    }

    fn count(&self) -> Result<Stats> {
        let (total, done): (i64, i64) = self.conn.query_row(
            &format!("SELECT COUNT(*), COALESCE(SUM(done != 0), 0) FROM {}", self.table),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(Stats::new(total as usize, done as usize))
    }
}
