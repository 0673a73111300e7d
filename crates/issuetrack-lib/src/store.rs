//! Persistence gateway for issue records.
//!
//! [`DocumentStore`] is the seam the HTTP layer talks to. [`InMemoryStore`]
//! keeps records in a `HashMap` and, when opened on a path, mirrors every
//! write to a JSONL file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::jsonl;
use crate::model::{Issue, NewIssue};
use crate::query::{Filter, IssueUpdate};
use crate::util::{generate_id, now_millis, validate_id};

/// A document store holding issue records.
///
/// Implementations provide per-document atomicity: a single insert,
/// update or delete is applied entirely or not at all.
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and diagnostics.
    fn backend(&self) -> &'static str;

    /// All issues matching every condition of `filter`, ordered by
    /// `created_on` then `_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn find(&self, filter: &Filter) -> Result<Vec<Issue>>;

    /// Persist a new issue, assigning its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn insert(&self, issue: NewIssue) -> Result<Issue>;

    /// Apply `update` to the issue with the given id and return the new record.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` for a malformed id (checked before lookup),
    /// `IssueNotFound` when no record has that id, or a backend error.
    fn update_by_id(&self, id: &str, update: &IssueUpdate) -> Result<Issue>;

    /// Delete the issue with the given id, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` for a malformed id, or a backend error.
    fn delete_by_id(&self, id: &str) -> Result<usize>;

    /// Total number of stored issues.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn count(&self) -> Result<usize>;
}

/// Order issues the way every store returns them.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| a.created_on.cmp(&b.created_on).then_with(|| a.id.cmp(&b.id)));
}

/// In-memory issue store, optionally mirrored to a JSONL file.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    issues: RwLock<HashMap<String, Issue>>,
    jsonl_path: Option<PathBuf>,
}

impl InMemoryStore {
    /// Create a new empty, process-local store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a file-backed store.
    ///
    /// A missing file starts empty and is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if it holds an issue with a malformed or duplicate id.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loaded = match jsonl::load(path) {
            Ok(issues) => issues,
            Err(TrackerError::FileNotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        let mut issues = HashMap::with_capacity(loaded.len());
        for issue in loaded {
            validate_id(&issue.id)?;
            if issues.contains_key(&issue.id) {
                return Err(TrackerError::IdCollision { id: issue.id });
            }
            issues.insert(issue.id.clone(), issue);
        }
        debug!(path = %path.display(), count = issues.len(), "loaded issue file");

        Ok(Self {
            issues: RwLock::new(issues),
            jsonl_path: Some(path.to_path_buf()),
        })
    }

    /// Path of the backing JSONL file, if any.
    #[must_use]
    pub fn jsonl_path(&self) -> Option<&Path> {
        self.jsonl_path.as_deref()
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Issue>>> {
        self.issues
            .read()
            .map_err(|_| TrackerError::Storage("issue map lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Issue>>> {
        self.issues
            .write()
            .map_err(|_| TrackerError::Storage("issue map lock poisoned".to_string()))
    }

    /// Mirror the map to the JSONL file, if one is configured.
    fn persist(&self, issues: &HashMap<String, Issue>) -> Result<()> {
        let Some(path) = self.jsonl_path.as_deref() else {
            return Ok(());
        };
        let mut ordered: Vec<&Issue> = issues.values().collect();
        ordered.sort_by(|a, b| a.created_on.cmp(&b.created_on).then_with(|| a.id.cmp(&b.id)));
        jsonl::save(path, &ordered)
    }
}

impl DocumentStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        if self.jsonl_path.is_some() {
            "jsonl"
        } else {
            "memory"
        }
    }

    fn find(&self, filter: &Filter) -> Result<Vec<Issue>> {
        let issues = self.read()?;
        let mut results: Vec<Issue> = issues
            .values()
            .filter(|issue| filter.matches(issue))
            .cloned()
            .collect();
        sort_issues(&mut results);
        Ok(results)
    }

    fn insert(&self, issue: NewIssue) -> Result<Issue> {
        let mut issues = self.write()?;
        let now = now_millis();
        let id = generate_id(
            &issue.project,
            &issue.issue_title,
            &issue.created_by,
            now,
            |id| Ok(issues.contains_key(id)),
        )?;
        let created = issue.into_issue(id.clone(), now);
        issues.insert(id.clone(), created.clone());

        // Keep memory and file in step: undo the insert if the file write fails.
        if let Err(e) = self.persist(&issues) {
            issues.remove(&id);
            return Err(e);
        }
        Ok(created)
    }

    fn update_by_id(&self, id: &str, update: &IssueUpdate) -> Result<Issue> {
        validate_id(id)?;
        let mut issues = self.write()?;
        let issue = issues
            .get_mut(id)
            .ok_or_else(|| TrackerError::IssueNotFound { id: id.to_string() })?;

        let previous = issue.clone();
        update.apply_to(issue);
        let updated = issue.clone();

        if let Err(e) = self.persist(&issues) {
            issues.insert(id.to_string(), previous);
            return Err(e);
        }
        Ok(updated)
    }

    fn delete_by_id(&self, id: &str) -> Result<usize> {
        validate_id(id)?;
        let mut issues = self.write()?;
        let Some(removed) = issues.remove(id) else {
            return Ok(0);
        };

        if let Err(e) = self.persist(&issues) {
            issues.insert(id.to_string(), removed);
            return Err(e);
        }
        Ok(1)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
