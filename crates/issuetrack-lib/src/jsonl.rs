//! JSONL file I/O for issue records.
//!
//! Each line in the file is one complete [`Issue`] document.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{Result, TrackerError};
use crate::model::Issue;

/// Load issues from a JSONL file.
///
/// Blank lines are skipped.
///
/// # Errors
///
/// Returns `FileNotFound` if the file does not exist, `Io` if it cannot be
/// read, or `JsonlParse` if any line is invalid.
pub fn load(path: &Path) -> Result<Vec<Issue>> {
    let file = fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TrackerError::FileNotFound(path.to_path_buf())
        } else {
            TrackerError::Io(e)
        }
    })?;
    let reader = BufReader::new(file);

    let mut issues = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let issue: Issue = serde_json::from_str(trimmed).map_err(|e| TrackerError::JsonlParse {
            line: line_num + 1,
            reason: e.to_string(),
        })?;
        issues.push(issue);
    }

    Ok(issues)
}

/// Save issues to a JSONL file with atomic write.
///
/// Writes to a sibling temp file, then renames over `path`.
///
/// # Errors
///
/// Returns `Io` if the file cannot be written, `Json` if a record fails to
/// serialize.
pub fn save(path: &Path, issues: &[&Issue]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("jsonl.tmp");
    let mut file = fs::File::create(&tmp_path)?;

    for issue in issues {
        let json = serde_json::to_string(issue)?;
        writeln!(file, "{json}")?;
    }

    file.flush()?;
    drop(file);

    fs::rename(&tmp_path, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewIssue;
    use crate::util::now_millis;

    fn make_issue(id: &str, title: &str) -> Issue {
        NewIssue {
            project: "p1".to_string(),
            issue_title: title.to_string(),
            issue_text: "text".to_string(),
            created_by: "user".to_string(),
            assigned_to: String::new(),
            status_text: String::new(),
        }
        .into_issue(id.to_string(), now_millis())
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.jsonl");

        let issue = make_issue("0123456789abcdef01234567", "Test issue");
        save(&path, &[&issue]).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, vec![issue]);
        assert!(!path.with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("issues.jsonl");
        save(&path, &[]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load(Path::new("/nonexistent/issues.jsonl"));
        assert!(matches!(result, Err(TrackerError::FileNotFound(_))));
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blanks.jsonl");
        let issue = make_issue("0123456789abcdef01234567", "Test");
        let json = serde_json::to_string(&issue).unwrap();
        fs::write(&path, format!("\n{json}\n\n")).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_load_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        let issue = make_issue("0123456789abcdef01234567", "Test");
        let json = serde_json::to_string(&issue).unwrap();
        fs::write(&path, format!("{json}\n{{not json}}\n")).unwrap();

        match load(&path) {
            Err(TrackerError::JsonlParse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
