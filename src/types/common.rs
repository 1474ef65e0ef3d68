//! Identifiers used to address jobs and builds.

use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

/// A Jenkins job name, the only key used to build job URLs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for JobName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&String> for JobName {
    fn from(value: &String) -> Self {
        Self::new(value.as_str())
    }
}

impl From<&JobName> for JobName {
    fn from(value: &JobName) -> Self {
        value.clone()
    }
}

/// Selects one build of a job: a concrete number or the most recent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildNumber {
    #[default]
    Latest,
    Number(u64),
}

impl BuildNumber {
    /// URL segment for this build (`lastBuild` or the number).
    #[must_use]
    pub fn segment(&self) -> String {
        match self {
            Self::Latest => "lastBuild".to_owned(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<u64> for BuildNumber {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<u64>> for BuildNumber {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Latest, Self::Number)
    }
}

impl FromStr for BuildNumber {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last" | "lastBuild" | "latest" => Ok(Self::Latest),
            other => other.parse().map(Self::Number),
        }
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segment())
    }
}

/// A Jenkins queue item id (treated as a string for maximum compatibility).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueItemId(String);

impl QueueItemId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
