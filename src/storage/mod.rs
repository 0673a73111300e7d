//! Store selection for `itrack`.
//!
//! A connection string picks the backend:
//! - `memory:` - process-local [`InMemoryStore`]
//! - `jsonl:<path>` - [`InMemoryStore`] mirrored to a JSONL file
//! - `sqlite:<path>` / `sqlite::memory:` - [`SqliteStore`]
//!
//! # Submodules
//!
//! - [`schema`] - `issues` table DDL and pragmas
//! - [`sqlite`] - `SQLite` implementation of [`DocumentStore`]

pub mod schema;
pub mod sqlite;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use issuetrack_lib::{DocumentStore, InMemoryStore};
use tracing::info;

pub use sqlite::SqliteStore;

use crate::error::{AppError, Result};

/// Parsed `database_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUrl {
    Memory,
    Jsonl(PathBuf),
    SqliteMemory,
    Sqlite(PathBuf),
}

impl FromStr for StoreUrl {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw == "memory:" {
            return Ok(Self::Memory);
        }
        if raw == "sqlite::memory:" {
            return Ok(Self::SqliteMemory);
        }

        let path = |rest: &str| {
            if rest.is_empty() {
                Err(AppError::config(format!(
                    "database url '{raw}' is missing a path"
                )))
            } else {
                Ok(PathBuf::from(rest))
            }
        };
        if let Some(rest) = raw.strip_prefix("jsonl:") {
            return Ok(Self::Jsonl(path(rest)?));
        }
        if let Some(rest) = raw.strip_prefix("sqlite:") {
            return Ok(Self::Sqlite(path(rest)?));
        }

        Err(AppError::config(format!(
            "unsupported database url '{raw}' (expected memory:, jsonl:<path> or sqlite:<path>)"
        )))
    }
}

/// Open the store named by `database_url`.
///
/// # Errors
///
/// Returns `Config` for an unknown scheme, or the backend's error when the
/// store cannot be opened.
pub fn open_store(database_url: &str) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match database_url.parse::<StoreUrl>()? {
        StoreUrl::Memory => Arc::new(InMemoryStore::new()),
        StoreUrl::Jsonl(path) => Arc::new(InMemoryStore::open(path)?),
        StoreUrl::SqliteMemory => Arc::new(SqliteStore::open_memory()?),
        StoreUrl::Sqlite(path) => Arc::new(SqliteStore::open(path)?),
    };
    info!(backend = store.backend(), "opened issue store");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_store_urls() {
        assert_eq!("memory:".parse::<StoreUrl>().unwrap(), StoreUrl::Memory);
        assert_eq!(
            "sqlite::memory:".parse::<StoreUrl>().unwrap(),
            StoreUrl::SqliteMemory
        );
        assert_eq!(
            "jsonl:data/issues.jsonl".parse::<StoreUrl>().unwrap(),
            StoreUrl::Jsonl(PathBuf::from("data/issues.jsonl"))
        );
        assert_eq!(
            "sqlite:/tmp/issues.db".parse::<StoreUrl>().unwrap(),
            StoreUrl::Sqlite(PathBuf::from("/tmp/issues.db"))
        );
    }

    #[test]
    fn test_reject_bad_urls() {
        assert!(matches!(
            "mongodb://localhost/issues".parse::<StoreUrl>(),
            Err(AppError::Config(_))
        ));
        assert!(matches!("jsonl:".parse::<StoreUrl>(), Err(AppError::Config(_))));
        assert!(matches!("".parse::<StoreUrl>(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_open_store_backends() {
        assert_eq!(open_store("memory:").unwrap().backend(), "memory");
        assert_eq!(open_store("sqlite::memory:").unwrap().backend(), "sqlite");

        let dir = tempfile::tempdir().unwrap();
        let url = format!("jsonl:{}", dir.path().join("issues.jsonl").display());
        assert_eq!(open_store(&url).unwrap().backend(), "jsonl");
    }
}
