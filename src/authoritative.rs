//! Parser for the authoritative artifact list.
//!
//! The list is plain text with one `project,version,filename,sha256` row per
//! line. Every line must match; a single malformed row aborts the parse so
//! that a truncated or corrupted list can never produce a partial catalog.

use crate::artifact::DeclaredArtifact;
use crate::catalog::Catalog;
use crate::error::{AuditError, Result};
use crate::sha256_digest::Sha256Digest;
use camino::Utf8Path;
use log::{debug, trace};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Shape of one row. The first three fields are matched lazily so that the
/// hash is always the final comma-separated field.
const ROW_PATTERN: &str = r"^(.+?),(.+?),(.+?),([a-f0-9]{64})$";

/// Inclusion predicate applied to each row as `(project, version, filename)`.
///
/// Rows for which the predicate returns `false` are skipped.
pub type RowFilter = dyn Fn(&str, &str, &str) -> bool;

/// Build the project-name filter.
///
/// The row passes when `pattern` matches anywhere in the project name.
///
/// # Errors
///
/// Returns [`AuditError::InvalidRegex`] if `pattern` does not compile.
///
/// # Examples
///
/// ```
/// use bandersnatch_audit::authoritative::project_name_filter;
///
/// let filter = project_name_filter("^num").expect("valid regex");
/// assert!(filter("numpy", "1.0", "numpy-1.0.tar.gz"));
/// assert!(!filter("scipy", "1.0", "scipy-1.0.tar.gz"));
/// ```
pub fn project_name_filter(pattern: &str) -> Result<Box<RowFilter>> {
    let regex = Regex::new(pattern).map_err(|source| AuditError::InvalidRegex { source })?;
    Ok(Box::new(
        move |project: &str, _version: &str, _filename: &str| regex.is_match(project),
    ))
}

/// Parse the authoritative list at `path`.
///
/// # Errors
///
/// Returns [`AuditError::ReadFilesTxt`] if the file cannot be opened, an
/// I/O error if reading it fails, or
/// [`AuditError::MalformedRow`] for the first line that does not match the
/// row shape.
pub fn parse_files_txt(
    path: &Utf8Path,
    filter: Option<&RowFilter>,
) -> Result<Catalog<DeclaredArtifact>> {
    let file = File::open(path).map_err(|source| AuditError::ReadFilesTxt {
        path: path.to_owned(),
        source,
    })?;
    let catalog = parse_rows(BufReader::new(file), filter)?;
    debug!(
        "parsed {} declared files across {} packages from {path}",
        catalog.file_count(),
        catalog.len()
    );
    Ok(catalog)
}

/// Parse authoritative rows from any buffered reader.
///
/// # Errors
///
/// Returns an I/O error if reading fails, or [`AuditError::MalformedRow`]
/// for the first line that does not match the row shape.
pub fn parse_rows<R: BufRead>(
    reader: R,
    filter: Option<&RowFilter>,
) -> Result<Catalog<DeclaredArtifact>> {
    let row_re = Regex::new(ROW_PATTERN).map_err(|source| AuditError::InvalidRegex { source })?;
    let mut catalog = Catalog::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        let Some(captures) = row_re.captures(line) else {
            return Err(AuditError::MalformedRow {
                line_number: index + 1,
                line: line.to_owned(),
            });
        };
        let (_, [project, version, filename, hash]) = captures.extract();

        if filter.is_some_and(|accept| !accept(project, version, filename)) {
            trace!("skipping {project} {version} {filename}");
            continue;
        }

        let sha256 = Sha256Digest::try_from(hash)?;
        catalog.add_file(
            project,
            Some(version),
            DeclaredArtifact::new(filename, sha256),
        );
    }

    Ok(catalog)
}
