//! Reader for the mirror's JSON simple index.
//!
//! A bandersnatch web directory holds a top-level project list at
//! `simple/index.v1_json` and one `simple/<project>/index.v1_json` per
//! project. File entries point at the shared storage area with URLs of the
//! form `../../packages/...`, relative to the project index.

use crate::artifact::MirrorArtifact;
use crate::catalog::Catalog;
use crate::error::{AuditError, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use log::debug;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Directory holding the simple index below the mirror root.
pub const SIMPLE_DIR: &str = "simple";

/// Filename of every JSON index document.
pub const INDEX_FILENAME: &str = "index.v1_json";

/// Prefix every file URL must carry.
pub const PACKAGES_URL_PREFIX: &str = "../../packages/";

/// Part of the prefix that climbs from the project index to the root.
const ROOT_RELATIVE_PREFIX: &str = "../../";

#[derive(Debug, Deserialize)]
struct ProjectList {
    projects: Vec<ProjectEntry>,
}

#[derive(Debug, Deserialize)]
struct ProjectEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectFiles {
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    filename: String,
    hashes: FileHashes,
    url: String,
}

#[derive(Debug, Deserialize)]
struct FileHashes {
    sha256: String,
}

/// Build the mirror catalog from the web directory at `root`.
///
/// Every listed project appears in the catalog, including projects whose
/// index lists no files. File digests are taken verbatim; a malformed one is
/// reported by verification, not here.
///
/// Besides the `../../packages/` prefix check, a decoded URL containing `..`
/// or root components is rejected so no resolved path can escape the web
/// directory. This is stricter than a plain prefix strip and makes such URLs
/// fatal.
///
/// # Errors
///
/// Returns [`AuditError::ReadIndex`] or [`AuditError::ParseIndex`] when an
/// index document is unreadable or malformed, and
/// [`AuditError::UnexpectedFileUrl`] when a file URL does not point into the
/// packages area or traverses out of it after decoding.
pub fn parse_web_dir(root: &Utf8Path) -> Result<Catalog<MirrorArtifact>> {
    let simple_dir = root.join(SIMPLE_DIR);
    let project_list: ProjectList = read_index(&simple_dir.join(INDEX_FILENAME))?;
    let mut catalog = Catalog::new();

    for project in project_list.projects {
        let index_path = simple_dir.join(&project.name).join(INDEX_FILENAME);
        let project_files: ProjectFiles = read_index(&index_path)?;
        let inventory = catalog.package_mut(&project.name);
        for file in project_files.files {
            let path = resolve_file_url(root, &project.name, &file.url)?;
            inventory.add_file(
                None,
                MirrorArtifact::new(file.filename, file.hashes.sha256, path),
            );
        }
    }

    debug!(
        "indexed {} mirror files across {} projects under {root}",
        catalog.file_count(),
        catalog.len()
    );
    Ok(catalog)
}

/// Resolve a file entry's URL to an absolute storage path under `root`.
///
/// The URL is checked for the `../../packages/` prefix before decoding, then
/// percent-decoded and re-rooted at `root`.
///
/// # Errors
///
/// Returns [`AuditError::UnexpectedFileUrl`] when the prefix is missing, the
/// decoded URL is not UTF-8, or the decoded path would leave the packages
/// area.
///
/// # Examples
///
/// ```
/// use bandersnatch_audit::mirror::resolve_file_url;
/// use camino::Utf8Path;
///
/// let path = resolve_file_url(
///     Utf8Path::new("/srv/web"),
///     "six",
///     "../../packages/ab/cd/six-1.16.0%2Bcpu.tar.gz",
/// )
/// .expect("valid URL");
/// assert_eq!(path, "/srv/web/packages/ab/cd/six-1.16.0+cpu.tar.gz");
/// ```
pub fn resolve_file_url(root: &Utf8Path, project: &str, url: &str) -> Result<Utf8PathBuf> {
    let reject = |reason: String| AuditError::UnexpectedFileUrl {
        project: project.to_owned(),
        url: url.to_owned(),
        reason,
    };

    if !url.starts_with(PACKAGES_URL_PREFIX) {
        return Err(reject(format!("expected prefix {PACKAGES_URL_PREFIX}")));
    }

    let decoded = percent_decode_str(url)
        .decode_utf8()
        .map_err(|e| reject(format!("decoded URL is not UTF-8: {e}")))?;
    let relative = Utf8Path::new(
        decoded
            .strip_prefix(ROOT_RELATIVE_PREFIX)
            .unwrap_or(&*decoded),
    );

    if relative
        .components()
        .any(|component| !matches!(component, Utf8Component::Normal(_)))
    {
        return Err(reject("decoded path leaves the packages directory".to_owned()));
    }

    Ok(root.join(relative))
}

fn read_index<T: DeserializeOwned>(path: &Utf8Path) -> Result<T> {
    let content = std::fs::read(path).map_err(|source| AuditError::ReadIndex {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| AuditError::ParseIndex {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
#[path = "mirror_tests.rs"]
mod tests;
