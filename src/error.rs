//! Error types shared by the stores and the shell.

use std::path::PathBuf;

use thiserror::Error;

use crate::task::TaskId;

#[derive(Debug, Error)]
pub enum TaskError {
    /// A required field was empty or still showed its placeholder.
    #[error("incomplete entry: {field} is required")]
    IncompleteEntry { field: &'static str },

    #[error("no task selected")]
    NothingSelected,

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("display line has {parts} part(s), expected 4")]
    MalformedDisplay { parts: usize },

    #[error("task file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no task ids left: the highest id is already in use")]
    IdsExhausted,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;
