//! Database schema for the `SQLite` issue store.

use rusqlite::Connection;
use std::time::Duration;

/// Column list in `Issue` serialization order; `id` holds `_id`.
pub const ISSUE_COLUMNS: &str = "id, project, issue_title, issue_text, created_on, updated_on, \
                                 created_by, assigned_to, open, status_text";

pub const SCHEMA_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS issues (
        id TEXT PRIMARY KEY,
        project TEXT NOT NULL,
        issue_title TEXT NOT NULL,
        issue_text TEXT NOT NULL,
        created_on TEXT NOT NULL,
        updated_on TEXT NOT NULL,
        created_by TEXT NOT NULL,
        assigned_to TEXT NOT NULL DEFAULT '',
        open INTEGER NOT NULL DEFAULT 1 CHECK (open IN (0, 1)),
        status_text TEXT NOT NULL DEFAULT ''
    );

    CREATE INDEX IF NOT EXISTS idx_issues_project_created
        ON issues(project, created_on, id);
";

/// Apply the schema. Idempotent.
///
/// # Errors
///
/// Returns an error if the DDL or pragmas fail.
pub fn apply_schema(conn: &Connection, file_backed: bool) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch(SCHEMA_SQL)?;
    if file_backed {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
    }
    Ok(())
}
