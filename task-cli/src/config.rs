use crate::store::{DEFAULT_TASK_FILE, StoreOptions};
use serde::Deserialize;
use std::path::PathBuf;

/// Optional settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "task-cli";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub file: PathBuf,
    pub lock: bool,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub file: Option<PathBuf>,
    pub no_lock: bool,
}

impl Config {
    /// Layers built-in defaults, an optional `task-cli.toml` and `overrides`.
    pub fn load(overrides: &Overrides) -> anyhow::Result<Self> {
        Self::load_from(config::File::with_name(CONFIG_FILE).required(false), overrides)
    }

    fn load_from<S>(source: S, overrides: &Overrides) -> anyhow::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .set_default("file", DEFAULT_TASK_FILE)?
            .set_default("lock", true)?
            .add_source(source)
            .set_override_option(
                "file",
                overrides
                    .file
                    .as_ref()
                    .map(|path| path.to_string_lossy().into_owned()),
            )?
            .set_override_option("lock", overrides.no_lock.then_some(false))?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            path: self.file.clone(),
            lock: self.lock,
        }
    }
}
