use crate::{JobName, QueueItemId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

const BUILDING_SUFFIX: &str = "_anime";

/// A job entry of `GET /api/python`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct JobSummary {
    pub name: JobName,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: JobColor,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl JobSummary {
    #[must_use]
    pub fn new(name: impl Into<JobName>, color: impl Into<JobColor>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// The server's compact status indicator, e.g. `blue` or `red_anime`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobColor(String);

impl JobColor {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a build is running right now.
    #[must_use]
    pub fn is_building(&self) -> bool {
        self.0.ends_with(BUILDING_SUFFIX)
    }

    /// The color with the in-progress marker stripped.
    #[must_use]
    pub fn base(&self) -> &str {
        self.0.strip_suffix(BUILDING_SUFFIX).unwrap_or(&self.0)
    }

    /// What the last build looked like; `None` for colors outside the known set.
    #[must_use]
    pub fn status(&self) -> Option<JobStatus> {
        match self.base() {
            "blue" | "green" => Some(JobStatus::Success),
            "red" => Some(JobStatus::Failed),
            "yellow" => Some(JobStatus::Unstable),
            "aborted" => Some(JobStatus::Aborted),
            "disabled" => Some(JobStatus::Disabled),
            "grey" | "notbuilt" => Some(JobStatus::NotBuilt),
            _ => None,
        }
    }
}

impl From<&str> for JobColor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for JobColor {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Human meaning of a [`JobColor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Success,
    Failed,
    Unstable,
    Aborted,
    Disabled,
    NotBuilt,
}

impl JobStatus {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Unstable => "UNSTABLE",
            Self::Aborted => "ABORTED",
            Self::Disabled => "DISABLED",
            Self::NotBuilt => "NOT BUILT",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed view of a build's `result` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildResult {
    Success,
    Failure,
    Unstable,
    Aborted,
    NotBuilt,
    Other(String),
}

impl BuildResult {
    /// Reads `result` from decoded build attributes; `None` while in progress.
    #[must_use]
    pub fn from_build(build: &Value) -> Option<Self> {
        build.get("result").and_then(Value::as_str).map(Self::parse)
    }

    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "SUCCESS" => Self::Success,
            "FAILURE" => Self::Failure,
            "UNSTABLE" => Self::Unstable,
            "ABORTED" => Self::Aborted,
            "NOT_BUILT" => Self::NotBuilt,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Unstable => "UNSTABLE",
            Self::Aborted => "ABORTED",
            Self::NotBuilt => "NOT_BUILT",
            Self::Other(raw) => raw,
        })
    }
}

/// Result of triggering a build.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct TriggeredBuild {
    pub status: http::StatusCode,
    /// Queue item id parsed from the `Location` header (when available).
    pub queue_item_id: Option<QueueItemId>,
    /// Raw `Location` header value (when available).
    pub location: Option<Box<str>>,
}

/// What [`crate::Jenkins::build`] hands back.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildOutcome {
    /// Trigger accepted; the build may not have started yet.
    Queued(TriggeredBuild),
    /// The waited-for build finished; decoded attributes of that build.
    Finished(Value),
}

impl BuildOutcome {
    #[must_use]
    pub fn result(&self) -> Option<BuildResult> {
        match self {
            Self::Queued(_) => None,
            Self::Finished(build) => BuildResult::from_build(build),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn color_meanings() {
        assert_eq!(JobColor::from("blue").status(), Some(JobStatus::Success));
        assert_eq!(JobColor::from("green").status(), Some(JobStatus::Success));
        assert_eq!(JobColor::from("red").status(), Some(JobStatus::Failed));
        assert_eq!(JobColor::from("yellow").status(), Some(JobStatus::Unstable));
        assert_eq!(JobColor::from("aborted").status(), Some(JobStatus::Aborted));
        assert_eq!(JobColor::from("disabled").status(), Some(JobStatus::Disabled));
        assert_eq!(JobColor::from("grey").status(), Some(JobStatus::NotBuilt));
        assert_eq!(JobColor::from("notbuilt").status(), Some(JobStatus::NotBuilt));
        assert_eq!(JobColor::from("purple").status(), None);
    }

    #[test]
    fn building_marker_is_stripped_before_lookup() {
        let color = JobColor::from("red_anime");
        assert!(color.is_building());
        assert_eq!(color.base(), "red");
        assert_eq!(color.status(), Some(JobStatus::Failed));
        assert!(!JobColor::from("red").is_building());
    }

    #[test]
    fn build_result_reads_result_field() {
        assert_eq!(
            BuildResult::from_build(&json!({"result": "FAILURE"})),
            Some(BuildResult::Failure)
        );
        assert_eq!(BuildResult::from_build(&json!({"result": null})), None);
        assert!(BuildResult::parse("SUCCESS").is_success());
        assert_eq!(BuildResult::parse("WEIRD").to_string(), "WEIRD");
    }

    #[test]
    fn job_summary_defaults_missing_color() {
        let job: JobSummary = serde_json::from_value(json!({"name": "folder"})).unwrap();
        assert_eq!(job.color.as_str(), "");
        assert_eq!(job.color.status(), None);
    }

    #[test]
    fn job_summary_accepts_null_color() {
        let listing = crate::literal::parse("{'jobs': [{'name': 'f', 'color': None}]}").unwrap();
        let jobs: Vec<JobSummary> = serde_json::from_value(listing["jobs"].clone()).unwrap();
        assert_eq!(jobs, vec![JobSummary::new("f", "")]);
    }
}
