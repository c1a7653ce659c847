use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A single to-do record as it is persisted in the task file.
#[derive(Debug, Eq, PartialEq, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Task {
    id: u32,
    description: String,
    status: Status,
    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    updated_at: NaiveDateTime,
}

impl Task {
    /// Creates a fresh `todo` task stamped with `now` for both timestamps.
    pub fn new(id: u32, description: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            description,
            status: Status::Todo,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    pub(crate) fn set_description(&mut self, description: String, now: NaiveDateTime) {
        self.description = description;
        self.touch(now);
    }

    pub(crate) fn set_status(&mut self, status: Status, now: NaiveDateTime) {
        self.status = status;
        self.touch(now);
    }

    /// Refreshes `updated_at`, never moving it backwards.
    pub(crate) fn touch(&mut self, now: NaiveDateTime) {
        self.updated_at = now.max(self.updated_at);
    }
}

#[derive(Debug, Default, Eq, PartialEq, Serialize, Deserialize, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Current local wall-clock time at the resolution the task file stores.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local().trunc_subsecs(0)
}

/// `YYYY-MM-DDTHH:MM:SS` (de)serialization for task timestamps.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
