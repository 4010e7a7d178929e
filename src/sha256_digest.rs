//! SHA-256 digest newtype for declared artifact hashes.
//!
//! Validates that the value is a 64-character lowercase hexadecimal string.
//! The authoritative list and computed hashes use this form. Mirror indexes
//! are not trusted to, so their digests stay plain text.

use crate::error::{AuditError, Result};
use serde::Deserialize;
use std::fmt;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// A validated hex-encoded SHA-256 digest string.
///
/// # Examples
///
/// ```
/// use bandersnatch_audit::sha256_digest::Sha256Digest;
///
/// let hex = "a".repeat(64);
/// let digest: Sha256Digest = hex.as_str().try_into().expect("valid digest");
/// assert_eq!(digest.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap the output of a finished `sha2` hasher.
    ///
    /// `LowerHex` on a SHA-256 output always yields 64 lowercase hex
    /// characters, so no validation is repeated here.
    pub(crate) fn from_finalized(output: &[u8]) -> Self {
        Self(output.iter().map(|byte| format!("{byte:02x}")).collect())
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = AuditError;

    fn try_from(value: &str) -> Result<Self> {
        validate_sha256(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = AuditError;

    fn try_from(value: String) -> Result<Self> {
        validate_sha256(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Sha256Digest> for String {
    fn from(digest: Sha256Digest) -> Self {
        digest.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed hex-encoded SHA-256 digest.
fn validate_sha256(value: &str) -> Result<()> {
    let invalid = |reason: String| AuditError::InvalidSha256Digest {
        value: value.to_owned(),
        reason,
    };
    if value.len() != DIGEST_HEX_LEN {
        return Err(invalid(format!(
            "expected {DIGEST_HEX_LEN} hex characters, got {}",
            value.len()
        )));
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(invalid(format!("non-hex character '{bad}'")));
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid("digest must be lowercase".to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn accepts_valid_sixty_four_char_hex() {
        let digest = Sha256Digest::try_from("0123456789abcdef".repeat(4).as_str());
        assert!(digest.is_ok());
    }

    #[rstest]
    #[case::too_short("abcdef".to_owned())]
    #[case::too_long("a".repeat(65))]
    #[case::non_hex(format!("{}g", "a".repeat(63)))]
    #[case::uppercase("A".repeat(64))]
    fn rejects_malformed_digests(#[case] value: String) {
        let err = Sha256Digest::try_from(value).expect_err("digest should be rejected");
        assert!(matches!(err, AuditError::InvalidSha256Digest { .. }));
    }

    #[test]
    fn from_finalized_matches_lower_hex() {
        let digest = Sha256Digest::from_finalized(&[0x00, 0xab, 0xff]);
        assert_eq!(digest.as_str(), "00abff");
    }

    #[test]
    fn deserializes_with_validation() {
        let ok: std::result::Result<Sha256Digest, _> =
            serde_json::from_str(&format!("\"{}\"", "b".repeat(64)));
        assert!(ok.is_ok());

        let bad: std::result::Result<Sha256Digest, _> = serde_json::from_str("\"short\"");
        assert!(bad.is_err());
    }
}
