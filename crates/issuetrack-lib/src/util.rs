//! Identifier generation, identifier validation and the record clock.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use sha2::{Digest, Sha256};

use crate::error::{Result, TrackerError};

/// Length of an issue identifier in hex characters (12 bytes).
pub const ID_LEN: usize = 24;

// ============================================================================
// ID Generation
// ============================================================================

/// Generate a unique issue identifier.
///
/// SHA256 over the record seed and a nonce, hex-encoded and cut to
/// [`ID_LEN`] characters. The `exists` closure checks for collisions;
/// the nonce advances until it reports a free id.
///
/// # Errors
///
/// Propagates the first error returned by `exists`.
pub fn generate_id<F>(
    project: &str,
    issue_title: &str,
    created_by: &str,
    created_on: DateTime<Utc>,
    exists: F,
) -> Result<String>
where
    F: Fn(&str) -> Result<bool>,
{
    let mut nonce = 0u32;
    loop {
        let seed = generate_id_seed(project, issue_title, created_by, created_on, nonce);
        let id = compute_id_hash(&seed);
        if !exists(&id)? {
            return Ok(id);
        }
        nonce = nonce.wrapping_add(1);
    }
}

fn generate_id_seed(
    project: &str,
    issue_title: &str,
    created_by: &str,
    created_on: DateTime<Utc>,
    nonce: u32,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        project,
        issue_title,
        created_by,
        created_on.timestamp_nanos_opt().unwrap_or(0),
        nonce
    )
}

fn compute_id_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(ID_LEN);
    for byte in digest.iter().take(ID_LEN / 2) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// Check that `id` is a well-formed issue identifier.
///
/// # Errors
///
/// Returns `InvalidId` unless `id` is exactly [`ID_LEN`] lowercase hex characters.
pub fn validate_id(id: &str) -> Result<()> {
    let well_formed = id.len() == ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if well_formed {
        Ok(())
    } else {
        Err(TrackerError::InvalidId { id: id.to_string() })
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Current time truncated to millisecond precision.
#[must_use]
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Next `updated_on` value for a record last touched at `previous`.
///
/// Always strictly greater than `previous`; when the clock has not moved
/// past it the previous value is bumped by one millisecond.
#[must_use]
pub fn next_updated_on(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_millis();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("p1", "Title", "User", now_millis(), |_| Ok(false)).unwrap();
        assert_eq!(id.len(), ID_LEN);
        assert!(validate_id(&id).is_ok());
    }

    #[test]
    fn test_generate_id_deterministic_for_same_seed() {
        let now = now_millis();
        let a = generate_id("p1", "Title", "User", now, |_| Ok(false)).unwrap();
        let b = generate_id("p1", "Title", "User", now, |_| Ok(false)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_id_collision_handling() {
        let generated = RefCell::new(HashSet::new());
        let now = now_millis();
        let id1 = generate_id("p1", "Title", "User", now, |id| {
            Ok(generated.borrow().contains(id))
        })
        .unwrap();
        generated.borrow_mut().insert(id1.clone());
        let id2 = generate_id("p1", "Title", "User", now, |id| {
            Ok(generated.borrow().contains(id))
        })
        .unwrap();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_id_propagates_lookup_error() {
        let result = generate_id("p1", "Title", "User", now_millis(), |_| {
            Err(TrackerError::Storage("lookup failed".to_string()))
        });
        assert!(matches!(result, Err(TrackerError::Storage(_))));
    }

    #[test]
    fn test_validate_id_rejects_malformed() {
        assert!(validate_id("invalidid").is_err());
        assert!(validate_id("").is_err());
        assert!(validate_id("ABCDEFABCDEFABCDEFABCDEF").is_err());
        assert!(validate_id("0123456789abcdef0123456g").is_err());
        assert!(validate_id("0123456789abcdef01234567").is_ok());
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_next_updated_on_strictly_increases() {
        let future = now_millis() + Duration::seconds(60);
        let next = next_updated_on(future);
        assert_eq!(next, future + Duration::milliseconds(1));

        let past = now_millis() - Duration::seconds(60);
        assert!(next_updated_on(past) > past);
    }
}
