//! Dotted-decimal version comparison.

use crate::core::{Error, Result};
use std::cmp::Ordering;

/// Number of leading segments that take part in a comparison.
const SIGNIFICANT_SEGMENTS: usize = 3;

fn segments(version: &str) -> [u64; SIGNIFICANT_SEGMENTS] {
    let mut out = [0; SIGNIFICANT_SEGMENTS];
    for (slot, part) in out.iter_mut().zip(version.split('.')) {
        // Oversized numbers saturate; anything non-numeric counts as zero.
        *slot = part.parse().unwrap_or_else(|_| {
            if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                u64::MAX
            } else {
                0
            }
        });
    }
    out
}

/// Compare two versions on major, minor and patch.
///
/// Missing segments count as zero and anything past the third is ignored,
/// so `"1.2"` equals `"1.2.0.9"`. A segment too large for `u64` compares
/// as `u64::MAX`.
pub fn compare_version(a: &str, b: &str) -> Ordering {
    segments(a).cmp(&segments(b))
}

/// Check that `version` is dot-separated decimal numbers.
pub fn validate_version(version: &str) -> Result<()> {
    let valid = version.split('.').all(|part| {
        !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) && part.parse::<u64>().is_ok()
    });

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidVersion(version.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_segments_are_zero() {
        assert_eq!(compare_version("1.2.0", "1.2"), Ordering::Equal);
        assert_eq!(compare_version("1", "1.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_ordering() {
        assert_eq!(compare_version("2.0.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_version("1.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_version("1.10.0", "1.9.0"), Ordering::Greater);
    }

    #[test]
    fn test_fourth_segment_ignored() {
        assert_eq!(compare_version("1.2.3.4", "1.2.3.9"), Ordering::Equal);
    }

    #[test]
    fn test_oversized_segment_saturates() {
        assert_eq!(compare_version("1.99999999999999999999", "1.5"), Ordering::Greater);
        assert_eq!(
            compare_version("1.99999999999999999999", &format!("1.{}", u64::MAX)),
            Ordering::Equal
        );
        assert_eq!(compare_version("1.x", "1.0"), Ordering::Equal);
    }

    #[test]
    fn test_validate() {
        assert!(validate_version("1").is_ok());
        assert!(validate_version("0.10.200").is_ok());
        assert!(validate_version("1.2.3.4").is_ok());

        for bad in ["", "1.", ".1", "1..2", "1.x", "v1.0", "1.0-beta", " 1.0"] {
            assert!(
                matches!(validate_version(bad), Err(Error::InvalidVersion(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
