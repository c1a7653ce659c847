use std::path::PathBuf;

/// Error type for TaskStore operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    /// No task carries the requested ID.
    #[error("No task with ID {0} present")]
    NotFound(u32),
    /// The task file exists but its content is not a valid task list.
    #[error("Cannot parse task file {}: {reason}", path.display())]
    ParseError { path: PathBuf, reason: String },
    /// The task file does not exist yet.
    #[error("Task file {} not found", .0.display())]
    MissingStore(PathBuf),
    /// The largest task ID is already `u32::MAX`.
    #[error("No task IDs left in {}", .0.display())]
    IdExhausted(PathBuf),
    /// A list filter that is not one of the known statuses.
    #[error("Invalid filter '{0}'. Use 'todo', 'in-progress', or 'done'")]
    InvalidFilter(String),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TaskStoreError>;
