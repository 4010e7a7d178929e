//! Existence and integrity checks for mirror artifacts.
//!
//! The scanner walks every artifact reconciliation selected, confirms the
//! file is on disk and, when the [`VerificationPolicy`] asks for it, streams
//! the file through SHA-256 and compares the result with the declared
//! digest. Failed artifacts are collected; only I/O errors abort the scan.

use crate::artifact::{Artifact, MirrorArtifact};
use crate::error::Result;
use crate::progress::{DEFAULT_PROGRESS_INTERVAL, ProgressLogger};
use crate::sha256_digest::Sha256Digest;
use log::{debug, trace};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Size of each read while hashing a file.
pub const HASH_CHUNK_SIZE: usize = 4096;

/// Policy governing how thoroughly each artifact is verified.
///
/// # Examples
///
/// ```
/// use bandersnatch_audit::verify::VerificationPolicy;
///
/// let policy = VerificationPolicy::default();
/// assert!(!policy.check_hashes());
/// assert!(VerificationPolicy::with_hashes().check_hashes());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationPolicy {
    check_hashes: bool,
}

impl VerificationPolicy {
    /// A policy that checks existence only.
    #[must_use]
    pub const fn existence_only() -> Self {
        Self {
            check_hashes: false,
        }
    }

    /// A policy that also recomputes and compares content hashes.
    #[must_use]
    pub const fn with_hashes() -> Self {
        Self { check_hashes: true }
    }

    /// Return whether content hashes are recomputed.
    #[must_use]
    pub fn check_hashes(&self) -> bool {
        self.check_hashes
    }
}

impl fmt::Display for VerificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.check_hashes {
            write!(f, "existence and SHA-256 verification")
        } else {
            write!(f, "existence verification only")
        }
    }
}

/// Why an artifact failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The storage path does not exist.
    Missing,
    /// The file content does not hash to the declared digest.
    HashMismatch {
        /// The digest computed from the file.
        actual: Sha256Digest,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "file is missing"),
            Self::HashMismatch { actual } => write!(f, "content hashes to {actual}"),
        }
    }
}

/// An artifact that failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationFailure {
    /// The artifact that failed.
    pub artifact: MirrorArtifact,
    /// Why it failed.
    pub reason: FailureReason,
}

/// Outcome of a verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Number of artifacts examined.
    pub checked: usize,
    /// The artifacts that failed, in scan order.
    pub failures: Vec<VerificationFailure>,
}

impl ScanSummary {
    /// Number of failed artifacts.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Compute the SHA-256 digest of `reader`, reading `chunk_size` bytes at a
/// time. A zero `chunk_size` reads one byte at a time.
///
/// # Errors
///
/// Returns any error raised by `reader`.
pub fn compute_sha256<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<Sha256Digest> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(Sha256Digest::from_finalized(&hasher.finalize()))
}

/// Verify one artifact under `policy`.
///
/// Returns `None` when the artifact passes. A missing file fails without
/// being opened.
///
/// # Errors
///
/// Returns an I/O error if an existing file cannot be opened or read.
pub fn verify_artifact(
    artifact: &MirrorArtifact,
    policy: VerificationPolicy,
) -> io::Result<Option<FailureReason>> {
    if !artifact.path().exists() {
        return Ok(Some(FailureReason::Missing));
    }
    if !policy.check_hashes() {
        return Ok(None);
    }

    let file = File::open(artifact.path())?;
    let actual = compute_sha256(file, HASH_CHUNK_SIZE)?;
    if actual.as_str() == artifact.sha256() {
        Ok(None)
    } else {
        Ok(Some(FailureReason::HashMismatch { actual }))
    }
}

/// Walks a set of artifacts, verifying each and reporting progress.
#[derive(Debug, Clone)]
pub struct VerificationScanner {
    policy: VerificationPolicy,
    progress_interval: Duration,
}

impl VerificationScanner {
    /// Create a scanner applying `policy`.
    #[must_use]
    pub fn new(policy: VerificationPolicy) -> Self {
        Self {
            policy,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Set the minimum gap between progress lines.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Verify every artifact in `artifacts`, writing progress lines to
    /// `progress`.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error raised while reading an existing file.
    pub fn scan<'a, I>(&self, artifacts: I, progress: &mut dyn Write) -> Result<ScanSummary>
    where
        I: IntoIterator<Item = &'a MirrorArtifact>,
        I::IntoIter: ExactSizeIterator,
    {
        let artifacts = artifacts.into_iter();
        let mut logger = ProgressLogger::with_interval(artifacts.len(), self.progress_interval);
        let mut summary = ScanSummary::default();

        for artifact in artifacts {
            trace!("verifying {artifact}");
            if let Some(reason) = verify_artifact(artifact, self.policy)? {
                debug!("{} failed verification: {reason}", artifact.name());
                summary.failures.push(VerificationFailure {
                    artifact: artifact.clone(),
                    reason,
                });
            }
            summary.checked += 1;
            logger.report_item(format_args!("Tested {artifact}"), progress);
        }

        Ok(summary)
    }
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
