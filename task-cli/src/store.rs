use crate::error::{Result, TaskStoreError};
use crate::repository::TaskRepository;
use crate::task::{self, Status, Task};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_TASK_FILE: &str = "tasks.json";

const TMP_SUFFIX: &str = ".tmp";
const LOCK_SUFFIX: &str = ".lock";

/// Where the store keeps its tasks and whether it guards them with a lock file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub path: PathBuf,
    pub lock: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_TASK_FILE),
            lock: true,
        }
    }
}

impl StoreOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Held for one load -> mutate -> persist cycle; unlocks on drop.
#[derive(Debug)]
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// File-backed task store. Every operation reloads the whole collection
/// and every mutation rewrites it.
#[derive(Debug, Clone)]
pub struct TaskStore {
    options: StoreOptions,
}

impl TaskStore {
    pub fn new(options: StoreOptions) -> Self {
        Self { options }
    }

    pub fn path(&self) -> &Path {
        &self.options.path
    }

    /// Reads the task file into memory.
    ///
    /// Returns [`TaskStoreError::MissingStore`] when the file does not exist and
    /// [`TaskStoreError::ParseError`] when its content is not a valid task list.
    pub fn load(&self) -> Result<TaskRepository> {
        let path = self.path();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TaskStoreError::MissingStore(path.to_path_buf()));
            }
            Err(source) => {
                return Err(TaskStoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let repository =
            TaskRepository::new_from_json(&contents).map_err(|e| TaskStoreError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        debug!(path = %path.display(), tasks = repository.len(), "Loaded tasks");
        Ok(repository)
    }

    /// Replaces the task file with `repository` by writing a sibling
    /// temporary file and renaming it into place. The temporary file is
    /// removed again if any step fails.
    pub fn persist(&self, repository: &TaskRepository) -> Result<()> {
        let path = self.path();
        let tmp_path = sibling(path, TMP_SUFFIX);
        let io_error = |at: &Path| {
            let at = at.to_path_buf();
            move |source| TaskStoreError::Io { path: at, source }
        };

        let file = File::create(&tmp_path).map_err(io_error(&tmp_path))?;
        let replace = || -> Result<()> {
            let mut writer = BufWriter::new(file);
            repository.save_as_json(&mut writer)?;
            let file = writer
                .into_inner()
                .map_err(|e| e.into_error())
                .map_err(io_error(&tmp_path))?;
            file.sync_all().map_err(io_error(&tmp_path))?;
            drop(file);
            fs::rename(&tmp_path, path).map_err(io_error(path))
        };
        if let Err(e) = replace() {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        debug!(path = %path.display(), tasks = repository.len(), "Persisted tasks");
        Ok(())
    }

    /// Appends a new `todo` task, creating the task file if needed.
    #[tracing::instrument(skip(self, description))]
    pub fn add(&self, description: impl Into<String>) -> Result<Task> {
        let _lock = self.lock(LockMode::Exclusive)?;
        let mut repository = match self.load() {
            Ok(repository) => repository,
            Err(TaskStoreError::MissingStore(path)) => {
                info!(path = %path.display(), "Creating task file");
                TaskRepository::new()
            }
            Err(e) => return Err(e),
        };

        let task = repository
            .add(description.into(), task::now())
            .cloned()
            .ok_or_else(|| TaskStoreError::IdExhausted(self.path().to_path_buf()))?;
        self.persist(&repository)?;
        info!(id = task.id(), "Task added");
        Ok(task)
    }

    /// Replaces the description of task `id`. The file is left untouched if
    /// no such task exists.
    #[tracing::instrument(skip(self, description))]
    pub fn update(&self, id: u32, description: impl Into<String>) -> Result<Task> {
        let _lock = self.lock_existing(LockMode::Exclusive)?;
        let mut repository = self.load()?;

        let task = repository
            .update_description(id, description.into(), task::now())
            .cloned()
            .ok_or(TaskStoreError::NotFound(id))?;
        self.persist(&repository)?;
        info!(id, "Task updated");
        Ok(task)
    }

    /// Removes task `id`. The file is left untouched if no such task exists.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, id: u32) -> Result<Task> {
        let _lock = self.lock_existing(LockMode::Exclusive)?;
        let mut repository = self.load()?;

        let task = repository
            .remove(id)
            .ok_or(TaskStoreError::NotFound(id))?;
        self.persist(&repository)?;
        info!(id, "Task deleted");
        Ok(task)
    }

    /// Descriptions of the tasks whose status matches `filter`, in creation
    /// order. `None` lists everything; an unknown token is rejected before
    /// the file is read.
    #[tracing::instrument(skip(self))]
    pub fn list(&self, filter: Option<&str>) -> Result<Vec<String>> {
        let status = parse_filter(filter)?;

        Ok(self
            .list_tasks(status)?
            .iter()
            .map(|task| task.description().to_owned())
            .collect())
    }

    /// Full task records matching `status`, in creation order.
    pub fn list_tasks(&self, status: Option<Status>) -> Result<Vec<Task>> {
        let _lock = self.lock_existing(LockMode::Shared)?;
        let repository = self.load()?;
        Ok(repository.filter_by_status(status).cloned().collect())
    }

    pub fn mark_in_progress(&self, id: u32) -> Result<Task> {
        self.mark(id, Status::InProgress)
    }

    pub fn mark_done(&self, id: u32) -> Result<Task> {
        self.mark(id, Status::Done)
    }

    #[tracing::instrument(skip(self))]
    fn mark(&self, id: u32, status: Status) -> Result<Task> {
        let _lock = self.lock_existing(LockMode::Exclusive)?;
        let mut repository = self.load()?;

        let task = repository
            .set_status(id, status, task::now())
            .cloned()
            .ok_or(TaskStoreError::NotFound(id))?;
        self.persist(&repository)?;
        info!(id, %status, "Task status changed");
        Ok(task)
    }

    /// Like [`Self::lock`], but reports a missing task file instead of
    /// leaving a lock file behind for it.
    fn lock_existing(&self, mode: LockMode) -> Result<Option<StoreLock>> {
        if !self.path().exists() {
            return Err(TaskStoreError::MissingStore(self.path().to_path_buf()));
        }
        self.lock(mode)
    }

    fn lock(&self, mode: LockMode) -> Result<Option<StoreLock>> {
        if !self.options.lock {
            return Ok(None);
        }

        let lock_path = sibling(self.path(), LOCK_SUFFIX);
        let lock_error = |source| TaskStoreError::Lock {
            path: lock_path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(lock_error)?;
        let locked = match mode {
            LockMode::Shared => FileExt::lock_shared(&file),
            LockMode::Exclusive => FileExt::lock_exclusive(&file),
        };
        locked.map_err(lock_error)?;

        debug!(path = %lock_path.display(), ?mode, "Acquired store lock");
        Ok(Some(StoreLock { file }))
    }
}

/// Turns a user-supplied status token into a list filter.
pub fn parse_filter(filter: Option<&str>) -> Result<Option<Status>> {
    filter
        .map(|token| {
            token
                .parse::<Status>()
                .map_err(|e| TaskStoreError::InvalidFilter(e.0))
        })
        .transpose()
}

/// `tasks.json` + `.lock` -> `tasks.json.lock`, in the same directory.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
