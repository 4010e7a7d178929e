//! Per-package inventories and the catalogs built from them.
//!
//! Both ingestion paths fold their records into a [`Catalog`], so the
//! reconciliation engine sees two values of the same shape and only the
//! artifact type differs.

use crate::artifact::Artifact;
use crate::identity::PackageIdentity;
use std::collections::{BTreeMap, BTreeSet};

/// The artifacts known for one package.
///
/// `files` is keyed by filename and a later record with the same name
/// replaces the earlier one. `versions` groups filenames by release and
/// resolves them through `files`, so a version never refers to a record the
/// file index no longer holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInventory<A> {
    name: String,
    versions: BTreeMap<String, BTreeSet<String>>,
    files: BTreeMap<String, A>,
}

impl<A: Artifact> PackageInventory<A> {
    /// Create an empty inventory for the package spelled `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: BTreeMap::new(),
            files: BTreeMap::new(),
        }
    }

    /// Record `artifact`, optionally under `version`.
    pub fn add_file(&mut self, version: Option<&str>, artifact: A) {
        let filename = artifact.name().to_owned();
        if let Some(version) = version {
            self.versions
                .entry(version.to_owned())
                .or_default()
                .insert(filename.clone());
        }
        self.files.insert(filename, artifact);
    }

    /// The package name as first seen by the source.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an artifact by filename.
    #[must_use]
    pub fn file(&self, filename: &str) -> Option<&A> {
        self.files.get(filename)
    }

    /// Every artifact of the package, ordered by filename.
    pub fn files(&self) -> impl Iterator<Item = &A> {
        self.files.values()
    }

    /// Every filename of the package.
    #[must_use]
    pub fn filenames(&self) -> BTreeSet<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// The versions recorded for the package.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.versions.keys().map(String::as_str)
    }

    /// The artifacts recorded under `version`.
    #[must_use]
    pub fn version_files(&self, version: &str) -> Vec<&A> {
        self.versions
            .get(version)
            .into_iter()
            .flatten()
            .filter_map(|filename| self.files.get(filename))
            .collect()
    }

    /// Number of artifacts in the package.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true when the package has no artifacts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Mapping from package identity to its inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog<A> {
    packages: BTreeMap<PackageIdentity, PackageInventory<A>>,
}

impl<A> Default for Catalog<A> {
    fn default() -> Self {
        Self {
            packages: BTreeMap::new(),
        }
    }
}

impl<A: Artifact> Catalog<A> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the inventory for `project`, creating an empty one on first
    /// sight.
    pub fn package_mut(&mut self, project: &str) -> &mut PackageInventory<A> {
        self.packages
            .entry(PackageIdentity::new(project))
            .or_insert_with(|| PackageInventory::new(project))
    }

    /// Fold one artifact into the catalog.
    pub fn add_file(&mut self, project: &str, version: Option<&str>, artifact: A) {
        self.package_mut(project).add_file(version, artifact);
    }

    /// Look up a package by identity.
    #[must_use]
    pub fn get(&self, identity: &PackageIdentity) -> Option<&PackageInventory<A>> {
        self.packages.get(identity)
    }

    /// Returns true when the catalog knows `identity`.
    #[must_use]
    pub fn contains(&self, identity: &PackageIdentity) -> bool {
        self.packages.contains_key(identity)
    }

    /// The package identities, in comparable-form order.
    pub fn identities(&self) -> impl Iterator<Item = &PackageIdentity> {
        self.packages.keys()
    }

    /// Packages with their inventories, in comparable-form order.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageIdentity, &PackageInventory<A>)> {
        self.packages.iter()
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns true when the catalog has no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Total number of artifacts across all packages.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.packages.values().map(PackageInventory::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::DeclaredArtifact;
    use crate::sha256_digest::Sha256Digest;

    fn declared(name: &str, fill: char) -> DeclaredArtifact {
        let digest = Sha256Digest::try_from(fill.to_string().repeat(64)).expect("valid digest");
        DeclaredArtifact::new(name, digest)
    }

    #[test]
    fn later_record_with_same_name_wins() {
        let mut inventory = PackageInventory::new("numpy");
        inventory.add_file(Some("1.0"), declared("numpy-1.0.tar.gz", 'a'));
        inventory.add_file(Some("1.0"), declared("numpy-1.0.tar.gz", 'b'));

        assert_eq!(inventory.len(), 1);
        let file = inventory.file("numpy-1.0.tar.gz").expect("file recorded");
        assert_eq!(file.sha256(), "b".repeat(64));
    }

    #[test]
    fn version_index_resolves_through_file_index() {
        let mut inventory = PackageInventory::new("numpy");
        inventory.add_file(Some("1.0"), declared("numpy-1.0.tar.gz", 'a'));
        inventory.add_file(Some("1.0"), declared("numpy-1.0-py3-none-any.whl", 'b'));
        inventory.add_file(Some("2.0"), declared("numpy-1.0.tar.gz", 'c'));
        inventory.add_file(None, declared("numpy-extra.zip", 'd'));

        assert_eq!(inventory.versions().collect::<Vec<_>>(), vec!["1.0", "2.0"]);
        for version in ["1.0", "2.0"] {
            for artifact in inventory.version_files(version) {
                assert_eq!(inventory.file(artifact.name()), Some(artifact));
            }
        }
        assert_eq!(inventory.version_files("2.0").len(), 1);
        assert_eq!(inventory.len(), 3);
    }

    #[test]
    fn catalog_folds_name_variants_into_one_package() {
        let mut catalog = Catalog::new();
        catalog.add_file("Foo_Bar", Some("1.0"), declared("foo_bar-1.0.tar.gz", 'a'));
        catalog.add_file("foo-bar", Some("1.1"), declared("foo_bar-1.1.tar.gz", 'b'));

        assert_eq!(catalog.len(), 1);
        let inventory = catalog
            .get(&PackageIdentity::new("FOO.BAR"))
            .expect("package present");
        assert_eq!(inventory.name(), "Foo_Bar");
        assert_eq!(inventory.len(), 2);
        assert_eq!(catalog.file_count(), 2);
    }

    #[test]
    fn package_mut_creates_empty_inventory() {
        let mut catalog: Catalog<DeclaredArtifact> = Catalog::new();
        catalog.package_mut("empty");

        let inventory = catalog
            .get(&PackageIdentity::new("empty"))
            .expect("package present");
        assert!(inventory.is_empty());
    }
}
