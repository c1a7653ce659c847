//! A personal task tracker backed by a single JSON file.
//!
//! [`TaskStore`] owns the file: each operation loads the whole collection,
//! changes it in memory through [`TaskRepository`], and writes it back.

pub mod config;
pub mod error;
pub mod repository;
pub mod store;
pub mod task;

pub use error::{Result, TaskStoreError};
pub use repository::TaskRepository;
pub use store::{StoreOptions, TaskStore};
pub use task::{Status, Task};
