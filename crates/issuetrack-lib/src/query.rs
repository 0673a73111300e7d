//! Filter and update types for issue operations.
//!
//! Both are built from untyped request input: a [`Filter`] from query
//! parameters, an [`IssueUpdate`] from a request body ([`FieldMap`]).

use std::collections::BTreeMap;

use serde_json::Value;

use crate::model::{FieldValue, Issue};
use crate::util::next_updated_on;

/// A decoded request body: field name to JSON value.
pub type FieldMap = serde_json::Map<String, Value>;

/// Coerce the `open` flag: exactly `"true"` is true, anything else is false.
///
/// Used identically by the read path (query strings) and the update path.
#[must_use]
pub fn parse_open_flag(raw: &str) -> bool {
    raw == "true"
}

/// Read a body value as text, treating falsy values as absent.
///
/// Non-empty strings pass through, non-zero numbers and `true` use their
/// display form. `null`, `false`, zero, `""`, arrays, objects and absent
/// keys yield `None`.
#[must_use]
pub fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Read the `open` flag from a body value; `None` only when the key is absent.
///
/// A JSON `true` counts as true, strings go through [`parse_open_flag`],
/// and everything else (including `null`) is false.
#[must_use]
pub fn open_flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => Some(parse_open_flag(s)),
        _ => Some(false),
    }
}

/// The `_id` a request addresses, if present and truthy.
#[must_use]
pub fn record_id(fields: &FieldMap) -> Option<String> {
    field_text(fields.get("_id"))
}

/// Equality filter over issue fields.
///
/// Keys are field names, values must all match. Keys the record does not
/// carry never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    fields: BTreeMap<String, FieldValue>,
}

impl Filter {
    /// Filter that selects every issue in `project`.
    #[must_use]
    pub fn for_project(project: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("project".to_string(), FieldValue::text(project));
        Self { fields }
    }

    /// Overlay raw query parameters as additional equality filters.
    ///
    /// Later entries replace earlier ones with the same key, including
    /// `project`. The `open` key is re-typed with [`parse_open_flag`].
    #[must_use]
    pub fn overlay<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        for (key, value) in params {
            let key = key.into();
            let value = if key == "open" {
                FieldValue::Bool(parse_open_flag(value.as_ref()))
            } else {
                FieldValue::text(value.as_ref())
            };
            self.fields.insert(key, value);
        }
        self
    }

    /// Add or replace a single equality condition.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every condition equals the issue's field.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        self.fields
            .iter()
            .all(|(key, expected)| issue.field(key).as_ref() == Some(expected))
    }
}

/// Fields to replace on an existing issue.
///
/// Text fields are only set when the request carried a truthy value;
/// `open` is set whenever present, including `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssueUpdate {
    /// Merge a request body into an update set.
    ///
    /// Keys other than the mutable fields (`_id`, `project`, timestamps,
    /// unknown names) are ignored.
    #[must_use]
    pub fn from_fields(fields: &FieldMap) -> Self {
        let text = |name: &str| field_text(fields.get(name));
        Self {
            issue_title: text("issue_title"),
            issue_text: text("issue_text"),
            created_by: text("created_by"),
            assigned_to: text("assigned_to"),
            status_text: text("status_text"),
            open: open_flag(fields.get("open")),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }

    /// Names of the fields this update sets.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.issue_title.is_some() {
            names.push("issue_title");
        }
        if self.issue_text.is_some() {
            names.push("issue_text");
        }
        if self.created_by.is_some() {
            names.push("created_by");
        }
        if self.assigned_to.is_some() {
            names.push("assigned_to");
        }
        if self.status_text.is_some() {
            names.push("status_text");
        }
        if self.open.is_some() {
            names.push("open");
        }
        names
    }

    /// Apply to `issue` and refresh its `updated_on`.
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(ref title) = self.issue_title {
            issue.issue_title.clone_from(title);
        }
        if let Some(ref text) = self.issue_text {
            issue.issue_text.clone_from(text);
        }
        if let Some(ref created_by) = self.created_by {
            issue.created_by.clone_from(created_by);
        }
        if let Some(ref assigned_to) = self.assigned_to {
            issue.assigned_to.clone_from(assigned_to);
        }
        if let Some(ref status_text) = self.status_text {
            issue.status_text.clone_from(status_text);
        }
        if let Some(open) = self.open {
            issue.open = open;
        }
        issue.updated_on = next_updated_on(issue.updated_on);
    }
}
