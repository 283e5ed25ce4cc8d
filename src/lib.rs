//! Personal task list: task storage, display adapters, and the terminal shell.

pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod store;
pub mod task;
pub mod theme;
pub mod ui;

pub use error::{Result, TaskError};
pub use store::TaskStore;
pub use task::{NameMatch, Stats, Task, TaskDraft, TaskFilter, TaskId};
