//! `issuetrack-lib` — issue records, filters and document stores.
//!
//! Store-agnostic core of the issuetrack service: the record shape, the
//! filter/update rules applied to request input, and the
//! [`DocumentStore`] trait with an in-memory (optionally JSONL-backed)
//! implementation.
//!
//! # Quick Start
//!
//! ```
//! use issuetrack_lib::{DocumentStore, Filter, InMemoryStore, IssueUpdate, NewIssue};
//! use serde_json::json;
//!
//! let store = InMemoryStore::new();
//!
//! // Create
//! let body = json!({"issue_title": "T", "issue_text": "X", "created_by": "U"});
//! let new = NewIssue::from_fields("p1", body.as_object().unwrap()).unwrap();
//! let issue = store.insert(new).unwrap();
//!
//! // Query
//! let open = store
//!     .find(&Filter::for_project("p1").overlay([("open", "true")]))
//!     .unwrap();
//! assert_eq!(open.len(), 1);
//!
//! // Update
//! let update = IssueUpdate { open: Some(false), ..Default::default() };
//! store.update_by_id(&issue.id, &update).unwrap();
//! ```

pub mod error;
pub mod jsonl;
pub mod model;
pub mod query;
pub mod store;
pub mod util;

pub use error::{Result, TrackerError};
pub use model::{FieldValue, ISSUE_FIELDS, Issue, NewIssue};
pub use query::{FieldMap, Filter, IssueUpdate, parse_open_flag};
pub use store::{DocumentStore, InMemoryStore};
