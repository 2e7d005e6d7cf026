use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::MergeError;

/// Timeframe stamped on a run right after it was re-run
pub const JUST_UPDATED: &str = "A few seconds ago";

/// Status of a test run
///
/// Variants are declared in display priority, so the derived ordering sorts failures first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Failed,
    Passed,
    #[default]
    Untested,
    Other(String),
}

impl RunStatus {
    /// Failed runs first, then passed, then untested, then anything else
    #[must_use]
    pub fn priority(&self) -> u8 {
        match self {
            RunStatus::Failed => 1,
            RunStatus::Passed => 2,
            RunStatus::Untested => 3,
            RunStatus::Other(_) => 4,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Failed => "Failed",
            RunStatus::Passed => "Passed",
            RunStatus::Untested => "Untested",
            RunStatus::Other(status) => status,
        }
    }
}

impl From<String> for RunStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Failed" => RunStatus::Failed,
            "Passed" => RunStatus::Passed,
            "Untested" => RunStatus::Untested,
            _ => RunStatus::Other(value),
        }
    }
}

impl From<&str> for RunStatus {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<RunStatus> for String {
    fn from(value: RunStatus) -> Self {
        match value {
            RunStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How recent a timeframe is, ordered from oldest to newest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Recency {
    /// Missing or unparsable, sorts as the oldest
    Unknown,
    At(DateTime<Utc>),
    /// The run was just re-run
    JustNow,
}

impl Recency {
    #[must_use]
    pub fn parse(timeframe: &str) -> Self {
        let raw = timeframe.trim();

        if raw == JUST_UPDATED {
            return Recency::JustNow;
        }

        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Recency::At(at.with_timezone(&Utc));
        }

        // Epoch milliseconds
        if let Ok(millis) = raw.parse::<i64>() {
            return DateTime::<Utc>::from_timestamp_millis(millis)
                .map_or(Recency::Unknown, Recency::At);
        }

        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
                return Recency::At(at.and_utc());
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map_or(Recency::Unknown, |at| Recency::At(at.and_utc()))
    }
}

/// One historical execution of a test file
///
/// Fields the dashboard does not know about are kept as they are and survive merges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    /// Empty when the source did not provide one, such runs are not loaded
    #[serde(default, deserialize_with = "string_or_number")]
    pub run_id: String,
    pub file_path: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub test_type: String,
    #[serde(default, deserialize_with = "status_or_null")]
    pub status: RunStatus,
    #[serde(default, deserialize_with = "string_or_number")]
    pub timeframe: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TestRun {
    pub fn new(
        run_id: impl Into<String>,
        file_path: impl Into<String>,
        status: impl Into<RunStatus>,
        timeframe: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            file_path: file_path.into(),
            team: String::new(),
            test_type: String::new(),
            status: status.into(),
            timeframe: timeframe.into(),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    #[must_use]
    pub fn with_test_type(mut self, test_type: impl Into<String>) -> Self {
        self.test_type = test_type.into();
        self
    }

    #[must_use]
    pub fn recency(&self) -> Recency {
        Recency::parse(&self.timeframe)
    }

    /// Merges the result of a re-run into this record
    ///
    /// Fields present in `result` replace existing ones, everything else is kept. The run id
    /// never changes and the timeframe is stamped with [`JUST_UPDATED`]. On error the record
    /// is left untouched.
    pub fn merge(&mut self, mut result: Map<String, Value>) -> Result<(), MergeError> {
        result.remove("runId");

        let decode = |source| MergeError::Decode {
            run_id: self.run_id.clone(),
            source,
        };

        let Value::Object(mut merged) = serde_json::to_value(&*self).map_err(decode)? else {
            return Err(MergeError::NotAnObject(self.run_id.clone()));
        };
        merged.extend(result);
        merged.insert("timeframe".into(), Value::String(JUST_UPDATED.into()));

        let updated: TestRun = serde_json::from_value(Value::Object(merged)).map_err(decode)?;
        *self = updated;

        Ok(())
    }
}

fn status_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RunStatus, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(RunStatus::from)
        .unwrap_or_default())
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {other}"
        ))),
    }
}
