//! `SQLite`-backed [`DocumentStore`].
//!
//! One connection behind a `Mutex`; every write is a single statement or a
//! short transaction, so a document is never observed half-updated.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use issuetrack_lib::model::timestamp;
use issuetrack_lib::util::{generate_id, now_millis, validate_id};
use issuetrack_lib::{DocumentStore, FieldValue, Filter, Issue, IssueUpdate, NewIssue, TrackerError};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::schema::{ISSUE_COLUMNS, apply_schema};
use crate::error::Result;

type TrackerResult<T> = issuetrack_lib::Result<T>;
type SqlParams = Vec<Box<dyn rusqlite::ToSql>>;

/// Issue store over a `SQLite` database.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn, true)?;
        debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn, false)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> TrackerResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| TrackerError::Storage("sqlite connection lock poisoned".to_string()))
    }
}

fn storage_err(e: rusqlite::Error) -> TrackerError {
    TrackerError::Storage(e.to_string())
}

/// SQL column for a filter key, with whether it holds a boolean.
fn column_for(key: &str) -> Option<(&'static str, bool)> {
    let column = match key {
        "_id" => ("id", false),
        "project" => ("project", false),
        "issue_title" => ("issue_title", false),
        "issue_text" => ("issue_text", false),
        "created_on" => ("created_on", false),
        "updated_on" => ("updated_on", false),
        "created_by" => ("created_by", false),
        "assigned_to" => ("assigned_to", false),
        "status_text" => ("status_text", false),
        "open" => ("open", true),
        _ => return None,
    };
    Some(column)
}

/// Compile a filter into a WHERE clause.
///
/// Returns `None` when the filter can never match: an unknown key, or a
/// value whose type differs from the column's.
fn where_clause(filter: &Filter) -> Option<(String, SqlParams)> {
    let mut sql = String::from(" WHERE 1=1");
    let mut params: SqlParams = Vec::with_capacity(filter.len());

    for (key, value) in filter.iter() {
        let (column, is_bool) = column_for(key)?;
        match (value, is_bool) {
            (FieldValue::Bool(b), true) => params.push(Box::new(*b)),
            (FieldValue::Text(s), false) => params.push(Box::new(s.clone())),
            _ => return None,
        }
        let _ = write!(sql, " AND {column} = ?");
    }
    Some((sql, params))
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn issue_from_row(row: &rusqlite::Row) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        project: row.get(1)?,
        issue_title: row.get(2)?,
        issue_text: row.get(3)?,
        created_on: parse_timestamp(4, &row.get::<_, String>(4)?)?,
        updated_on: parse_timestamp(5, &row.get::<_, String>(5)?)?,
        created_by: row.get(6)?,
        assigned_to: row.get(7)?,
        open: row.get(8)?,
        status_text: row.get(9)?,
    })
}

impl DocumentStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn find(&self, filter: &Filter) -> TrackerResult<Vec<Issue>> {
        let Some((clause, params)) = where_clause(filter) else {
            debug!(?filter, "filter cannot match any column; skipping query");
            return Ok(Vec::new());
        };
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues{clause} ORDER BY created_on, id");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let rows = stmt
            .query_map(param_refs.as_slice(), issue_from_row)
            .map_err(storage_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage_err)
    }

    fn insert(&self, issue: NewIssue) -> TrackerResult<Issue> {
        let conn = self.lock()?;
        let now = now_millis();
        let id = generate_id(
            &issue.project,
            &issue.issue_title,
            &issue.created_by,
            now,
            |candidate| {
                conn.prepare_cached("SELECT 1 FROM issues WHERE id = ?1")
                    .and_then(|mut stmt| stmt.exists([candidate]))
                    .map_err(storage_err)
            },
        )?;
        let created = issue.into_issue(id, now);

        conn.execute(
            &format!(
                "INSERT INTO issues ({ISSUE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                created.id,
                created.project,
                created.issue_title,
                created.issue_text,
                timestamp::format(&created.created_on),
                timestamp::format(&created.updated_on),
                created.created_by,
                created.assigned_to,
                created.open,
                created.status_text,
            ],
        )
        .map_err(storage_err)?;
        Ok(created)
    }

    fn update_by_id(&self, id: &str, update: &IssueUpdate) -> TrackerResult<Issue> {
        validate_id(id)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage_err)?;

        let mut issue = tx
            .query_row(
                &format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?1"),
                [id],
                issue_from_row,
            )
            .optional()
            .map_err(storage_err)?
            .ok_or_else(|| TrackerError::IssueNotFound { id: id.to_string() })?;

        update.apply_to(&mut issue);

        tx.execute(
            "UPDATE issues SET issue_title = ?1, issue_text = ?2, created_by = ?3, \
             assigned_to = ?4, status_text = ?5, open = ?6, updated_on = ?7 WHERE id = ?8",
            params![
                issue.issue_title,
                issue.issue_text,
                issue.created_by,
                issue.assigned_to,
                issue.status_text,
                issue.open,
                timestamp::format(&issue.updated_on),
                issue.id,
            ],
        )
        .map_err(storage_err)?;
        tx.commit().map_err(storage_err)?;
        Ok(issue)
    }

    fn delete_by_id(&self, id: &str) -> TrackerResult<usize> {
        validate_id(id)?;
        let conn = self.lock()?;
        conn.execute("DELETE FROM issues WHERE id = ?1", [id])
            .map_err(storage_err)
    }

    fn count(&self) -> TrackerResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))
            .map_err(storage_err)?;
        usize::try_from(count).map_err(|e| TrackerError::Storage(e.to_string()))
    }
}
