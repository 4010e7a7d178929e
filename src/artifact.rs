//! Artifact records on both sides of the audit.
//!
//! The authoritative list only declares a filename and its digest
//! ([`DeclaredArtifact`]). The mirror additionally knows where the file is
//! stored ([`MirrorArtifact`]), which is what makes it verifiable.

use crate::sha256_digest::Sha256Digest;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// Read-only view shared by every artifact record.
pub trait Artifact {
    /// The distributable filename, unique within a package.
    fn name(&self) -> &str;

    /// The hex digest the source declares for the file.
    fn sha256(&self) -> &str;
}

/// An artifact named by the authoritative list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredArtifact {
    name: String,
    sha256: Sha256Digest,
}

impl DeclaredArtifact {
    /// Create a declared artifact.
    #[must_use]
    pub fn new(name: impl Into<String>, sha256: Sha256Digest) -> Self {
        Self {
            name: name.into(),
            sha256,
        }
    }
}

impl Artifact for DeclaredArtifact {
    fn name(&self) -> &str {
        &self.name
    }

    fn sha256(&self) -> &str {
        self.sha256.as_str()
    }
}

/// An artifact listed by the mirror index, resolved to its storage path.
///
/// The digest is kept exactly as the index spells it. A malformed value only
/// surfaces as a hash mismatch when the file is verified.
///
/// # Examples
///
/// ```
/// use bandersnatch_audit::artifact::{Artifact, MirrorArtifact};
///
/// let artifact = MirrorArtifact::new("pkg-1.0.tar.gz", "ABC", "/web/packages/pkg-1.0.tar.gz");
/// assert_eq!(artifact.name(), "pkg-1.0.tar.gz");
/// assert_eq!(artifact.sha256(), "ABC");
/// assert!(artifact.to_string().ends_with(": /web/packages/pkg-1.0.tar.gz"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MirrorArtifact {
    name: String,
    sha256: String,
    path: Utf8PathBuf,
}

impl MirrorArtifact {
    /// Create a mirror artifact stored at `path`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        sha256: impl Into<String>,
        path: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            sha256: sha256.into(),
            path: path.into(),
        }
    }

    /// Absolute location of the file inside the mirror.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Artifact for MirrorArtifact {
    fn name(&self) -> &str {
        &self.name
    }

    fn sha256(&self) -> &str {
        &self.sha256
    }
}

impl fmt::Display for MirrorArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.sha256, self.path)
    }
}
