use crate::task::{Status, Task};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

/// Ways a persisted task collection can fail to decode.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("duplicate task ID {0}")]
    DuplicateId(u32),
    #[error("task IDs must be positive")]
    ZeroId,
}

/// The ordered, in-memory task collection. Insertion order is creation order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskRepository {
    tasks: Vec<Task>,
}

impl TaskRepository {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn new_from_json(json: &str) -> Result<Self, DecodeError> {
        let tasks: Vec<Task> = serde_json::from_str(json)?;
        if tasks.iter().any(|task| task.id() == 0) {
            return Err(DecodeError::ZeroId);
        }
        let mut seen = HashSet::with_capacity(tasks.len());
        if let Some(duplicate) = tasks.iter().find(|task| !seen.insert(task.id())) {
            return Err(DecodeError::DuplicateId(duplicate.id()));
        }
        Ok(Self { tasks })
    }

    /// Writes the collection as a JSON array indented with four spaces.
    pub fn save_as_json(&self, writer: impl std::io::Write) -> serde_json::Result<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        self.tasks.serialize(&mut serializer)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// One past the largest id present, or 1 for an empty collection.
    /// `None` once the largest id is `u32::MAX`.
    pub fn next_id(&self) -> Option<u32> {
        match self.tasks.iter().map(Task::id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        }
    }

    /// Appends a new `todo` task, or returns `None` when no id is left.
    pub fn add(&mut self, description: String, now: NaiveDateTime) -> Option<&Task> {
        let task = Task::new(self.next_id()?, description, now);
        self.tasks.push(task);
        self.tasks.last()
    }

    pub fn find_by_id(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    fn find_by_id_mut(&mut self, id: u32) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == id)
    }

    pub fn update_description(
        &mut self,
        id: u32,
        description: String,
        now: NaiveDateTime,
    ) -> Option<&Task> {
        let task = self.find_by_id_mut(id)?;
        task.set_description(description, now);
        Some(task)
    }

    pub fn set_status(&mut self, id: u32, status: Status, now: NaiveDateTime) -> Option<&Task> {
        let task = self.find_by_id_mut(id)?;
        task.set_status(status, now);
        Some(task)
    }

    pub fn remove(&mut self, id: u32) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id() == id)?;
        Some(self.tasks.remove(index))
    }

    /// Tasks matching `status` (all tasks for `None`), in collection order.
    pub fn filter_by_status(&self, status: Option<Status>) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(move |task| status.is_none_or(|wanted| task.status() == wanted))
    }
}
