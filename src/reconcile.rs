//! Set algebra between the authoritative and mirror catalogs.
//!
//! Reconciliation is pure: it reads two catalogs and returns every
//! discrepancy class plus the artifacts the scanner should verify. Results
//! are ordered sets so reports are deterministic.

use crate::artifact::{DeclaredArtifact, MirrorArtifact};
use crate::catalog::Catalog;
use crate::identity::PackageIdentity;
use std::collections::BTreeSet;

/// Discrepancies between the authoritative list and the mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Packages declared but absent from the mirror.
    pub missing_packages: BTreeSet<PackageIdentity>,
    /// Packages present in the mirror but not declared.
    pub unexpected_packages: BTreeSet<PackageIdentity>,
    /// The unexpected packages whose mirror inventory is not empty.
    pub unexpected_with_files: BTreeSet<PackageIdentity>,
    /// Packages present on both sides.
    pub in_both: BTreeSet<PackageIdentity>,
    /// Declared filenames the mirror does not list.
    ///
    /// Filenames are not qualified by package.
    pub missing_files: BTreeSet<String>,
    /// Mirror filenames the authoritative list does not declare.
    ///
    /// Filenames are not qualified by package.
    pub unexpected_files: BTreeSet<String>,
    /// Every mirror artifact of every package present on both sides.
    pub files_to_verify: BTreeSet<MirrorArtifact>,
}

/// Compare `authoritative` against `mirror`.
///
/// Package identities are compared by their normalized form, so a package
/// spelled `Foo_Bar` in one source and `foo-bar` in the other is in both.
/// The returned identities keep the spelling of the side they were found on
/// (the mirror's for packages in both).
///
/// # Examples
///
/// ```
/// use bandersnatch_audit::artifact::{DeclaredArtifact, MirrorArtifact};
/// use bandersnatch_audit::catalog::Catalog;
/// use bandersnatch_audit::reconcile::reconcile;
/// use bandersnatch_audit::sha256_digest::Sha256Digest;
///
/// let digest = Sha256Digest::try_from("0".repeat(64).as_str()).expect("valid digest");
/// let mut declared = Catalog::new();
/// declared.add_file("Foo_Bar", Some("1.0"), DeclaredArtifact::new("a.whl", digest.clone()));
/// let mut mirrored = Catalog::new();
/// mirrored.add_file("foo-bar", None, MirrorArtifact::new("b.whl", digest, "/web/packages/b.whl"));
///
/// let result = reconcile(&declared, &mirrored);
/// assert_eq!(result.in_both.len(), 1);
/// assert!(result.missing_files.contains("a.whl"));
/// assert!(result.unexpected_files.contains("b.whl"));
/// assert_eq!(result.files_to_verify.len(), 1);
/// ```
#[must_use]
pub fn reconcile(
    authoritative: &Catalog<DeclaredArtifact>,
    mirror: &Catalog<MirrorArtifact>,
) -> Reconciliation {
    let mut result = Reconciliation::default();

    for identity in authoritative.identities() {
        if !mirror.contains(identity) {
            result.missing_packages.insert(identity.clone());
        }
    }

    for (identity, mirror_inventory) in mirror.iter() {
        let Some(declared_inventory) = authoritative.get(identity) else {
            result.unexpected_packages.insert(identity.clone());
            if !mirror_inventory.is_empty() {
                result.unexpected_with_files.insert(identity.clone());
            }
            continue;
        };

        result.in_both.insert(identity.clone());

        let mirror_names = mirror_inventory.filenames();
        let declared_names = declared_inventory.filenames();
        result.missing_files.extend(
            declared_names
                .difference(&mirror_names)
                .map(|name| (*name).to_owned()),
        );
        result.unexpected_files.extend(
            mirror_names
                .difference(&declared_names)
                .map(|name| (*name).to_owned()),
        );
        result
            .files_to_verify
            .extend(mirror_inventory.files().cloned());
    }

    result
}

impl Reconciliation {
    /// Number of unexpected packages whose inventory is empty.
    #[must_use]
    pub fn unexpected_without_files(&self) -> usize {
        self.unexpected_packages.len() - self.unexpected_with_files.len()
    }
}
