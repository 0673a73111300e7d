//! Core data types for issuetrack-lib.
//!
//! The serialized form of [`Issue`] is the public record shape: the HTTP
//! layer returns it verbatim and the JSONL store writes it line by line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::query::{FieldMap, field_text};

/// Field names that identify and describe an issue, in serialization order.
pub const ISSUE_FIELDS: &[&str] = &[
    "_id",
    "project",
    "issue_title",
    "issue_text",
    "created_on",
    "updated_on",
    "created_by",
    "assigned_to",
    "open",
    "status_text",
];

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[must_use]
    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    /// # Errors
    ///
    /// Fails when the input is not an RFC 3339 timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

const fn default_open() -> bool {
    true
}

/// A typed equality operand: what a filter compares against and what
/// [`Issue::field`] yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
}

impl FieldValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// The issue record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Store-generated identifier (24 lowercase hex characters).
    #[serde(rename = "_id")]
    pub id: String,

    /// Project the issue belongs to; fixed at creation.
    pub project: String,

    pub issue_title: String,

    pub issue_text: String,

    /// Creation timestamp; never changes.
    #[serde(with = "timestamp")]
    pub created_on: DateTime<Utc>,

    /// Last write timestamp; strictly increases on every update.
    #[serde(with = "timestamp")]
    pub updated_on: DateTime<Utc>,

    pub created_by: String,

    #[serde(default)]
    pub assigned_to: String,

    #[serde(default = "default_open")]
    pub open: bool,

    #[serde(default)]
    pub status_text: String,
}

impl Issue {
    /// Look up a field by its serialized name.
    ///
    /// Returns `None` for names the record does not carry, so an equality
    /// filter on an unknown key matches nothing.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "_id" => FieldValue::text(&self.id),
            "project" => FieldValue::text(&self.project),
            "issue_title" => FieldValue::text(&self.issue_title),
            "issue_text" => FieldValue::text(&self.issue_text),
            "created_by" => FieldValue::text(&self.created_by),
            "assigned_to" => FieldValue::text(&self.assigned_to),
            "status_text" => FieldValue::text(&self.status_text),
            "created_on" => FieldValue::Text(timestamp::format(&self.created_on)),
            "updated_on" => FieldValue::Text(timestamp::format(&self.updated_on)),
            "open" => FieldValue::Bool(self.open),
            _ => return None,
        };
        Some(value)
    }
}

/// Validated input for a new issue, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub project: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

impl NewIssue {
    /// Build a new issue from a request body.
    ///
    /// `issue_title`, `issue_text` and `created_by` must be present and
    /// non-empty; `assigned_to` and `status_text` default to `""`.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequired` naming every absent required field.
    pub fn from_fields(project: &str, fields: &FieldMap) -> Result<Self> {
        let required = |name: &'static str| field_text(fields.get(name));

        let issue_title = required("issue_title");
        let issue_text = required("issue_text");
        let created_by = required("created_by");

        match (issue_title, issue_text, created_by) {
            (Some(issue_title), Some(issue_text), Some(created_by)) => Ok(Self {
                project: project.to_string(),
                issue_title,
                issue_text,
                created_by,
                assigned_to: field_text(fields.get("assigned_to")).unwrap_or_default(),
                status_text: field_text(fields.get("status_text")).unwrap_or_default(),
            }),
            (title, text, by) => {
                let mut missing = Vec::new();
                if title.is_none() {
                    missing.push("issue_title");
                }
                if text.is_none() {
                    missing.push("issue_text");
                }
                if by.is_none() {
                    missing.push("created_by");
                }
                Err(TrackerError::MissingRequired { fields: missing })
            }
        }
    }

    /// Materialize the record: `open` starts true, both timestamps equal `now`.
    #[must_use]
    pub fn into_issue(self, id: String, now: DateTime<Utc>) -> Issue {
        Issue {
            id,
            project: self.project,
            issue_title: self.issue_title,
            issue_text: self.issue_text,
            created_on: now,
            updated_on: now,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            open: true,
            status_text: self.status_text,
        }
    }
}
