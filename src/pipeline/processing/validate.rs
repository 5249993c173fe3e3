use thiserror::Error;

use crate::types::RawChangeRecord;

/// Which side(s) of a change record failed the width check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarantineSide {
    Old,
    New,
    Both,
}

/// Why a record was routed to quarantine instead of being transformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected} fields, old list has {old_len}, new list has {new_len} ({side:?} out of schema)")]
pub struct QuarantineReason {
    pub side: QuarantineSide,
    pub expected: usize,
    pub old_len: usize,
    pub new_len: usize,
}

/// A change record held back for manual review. Quarantine is terminal: these
/// rows never re-enter the transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineRecord {
    pub order_num: String,
    pub record: RawChangeRecord,
    pub old_fields: Vec<String>,
    pub new_fields: Vec<String>,
    pub reason: QuarantineReason,
}

/// Check one parsed field list against the schema width; `Err` carries the
/// actual width
pub fn validate(fields: &[String], expected_width: usize) -> Result<(), usize> {
    if fields.len() == expected_width {
        Ok(())
    } else {
        Err(fields.len())
    }
}

/// A record passes only when both sides have exactly `expected_width` fields
pub fn validate_pair(
    old: &[String],
    new: &[String],
    expected_width: usize,
) -> Result<(), QuarantineReason> {
    let side = match (validate(old, expected_width), validate(new, expected_width)) {
        (Ok(()), Ok(())) => return Ok(()),
        (Err(_), Ok(())) => QuarantineSide::Old,
        (Ok(()), Err(_)) => QuarantineSide::New,
        (Err(_), Err(_)) => QuarantineSide::Both,
    };

    Err(QuarantineReason {
        side,
        expected: expected_width,
        old_len: old.len(),
        new_len: new.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("F{}: {}", i, i)).collect()
    }

    #[test]
    fn validate_passes_exact_width() {
        assert!(validate(&list(3), 3).is_ok());
        assert_eq!(validate(&list(2), 3).unwrap_err(), 2);
    }

    #[test]
    fn pair_with_both_sides_valid_passes() {
        assert!(validate_pair(&list(55), &list(55), 55).is_ok());
    }

    #[test]
    fn pair_reports_failing_side() {
        let reason = validate_pair(&list(54), &list(55), 55).unwrap_err();
        assert_eq!(reason.side, QuarantineSide::Old);
        assert_eq!(reason.old_len, 54);

        let reason = validate_pair(&list(55), &list(56), 55).unwrap_err();
        assert_eq!(reason.side, QuarantineSide::New);

        let reason = validate_pair(&list(0), &list(56), 55).unwrap_err();
        assert_eq!(reason.side, QuarantineSide::Both);
        assert!(reason.to_string().contains("expected 55 fields"));
    }
}
