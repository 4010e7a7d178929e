//! Report files describing the discrepancies of a run.
//!
//! Each report is a UTF-8 text file with one entry per line, written to the
//! configured output directory. Entries follow the ordering of the sets they
//! come from, so repeated runs over the same inputs produce identical files.

use crate::error::{AuditError, Result};
use crate::reconcile::Reconciliation;
use crate::verify::VerificationFailure;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};

/// Declared packages absent from the mirror.
pub const MISSING_PACKAGES_REPORT: &str = "bandersnatch_missing_packages.txt";
/// Undeclared mirror packages that list at least one file.
pub const UNEXPECTED_PACKAGES_REPORT: &str = "bandersnatch_unexpected_packages.txt";
/// Artifacts that failed verification.
pub const BAD_FILES_REPORT: &str = "bad_files.txt";
/// Declared filenames absent from the mirror.
pub const MISSING_FILES_REPORT: &str = "bandersnatch_missing_files.txt";
/// Mirror filenames absent from the authoritative list.
pub const UNEXPECTED_FILES_REPORT: &str = "bandersnatch_unexpected_files.txt";

/// Writes report files into one output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: Utf8PathBuf,
}

impl ReportWriter {
    /// Create a writer targeting `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The directory reports are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Path of the report called `name`.
    #[must_use]
    pub fn report_path(&self, name: &str) -> Utf8PathBuf {
        self.output_dir.join(name)
    }

    /// Create the output directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::WriteReport`] if the directory cannot be created.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|source| AuditError::WriteReport {
            path: self.output_dir.clone(),
            source,
        })
    }

    /// Write the missing and unexpected package reports.
    ///
    /// Both files are always created. Only unexpected packages that list at
    /// least one file are written; empty mirror projects are not actionable.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::WriteReport`] naming the file that failed.
    pub fn write_package_reports(&self, reconciliation: &Reconciliation) -> Result<()> {
        self.write_lines(MISSING_PACKAGES_REPORT, &reconciliation.missing_packages)?;
        self.write_lines(
            UNEXPECTED_PACKAGES_REPORT,
            &reconciliation.unexpected_with_files,
        )?;
        Ok(())
    }

    /// Write `bad_files.txt`, creating it even when nothing failed.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::WriteReport`] if the file cannot be written.
    pub fn write_bad_files(&self, failures: &[VerificationFailure]) -> Result<Utf8PathBuf> {
        self.write_lines(
            BAD_FILES_REPORT,
            failures
                .iter()
                .map(|failure| format!("{} is missing or corrupted", failure.artifact)),
        )
    }

    /// Write the missing-file report when there is at least one entry.
    ///
    /// Returns the path written, or `None` when the report was skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::WriteReport`] if the file cannot be written.
    pub fn write_missing_files(
        &self,
        reconciliation: &Reconciliation,
    ) -> Result<Option<Utf8PathBuf>> {
        self.write_non_empty(MISSING_FILES_REPORT, &reconciliation.missing_files)
    }

    /// Write the unexpected-file report when there is at least one entry.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::WriteReport`] if the file cannot be written.
    pub fn write_unexpected_files(
        &self,
        reconciliation: &Reconciliation,
    ) -> Result<Option<Utf8PathBuf>> {
        self.write_non_empty(UNEXPECTED_FILES_REPORT, &reconciliation.unexpected_files)
    }

    fn write_non_empty<I>(&self, name: &str, entries: I) -> Result<Option<Utf8PathBuf>>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            debug!("skipping empty report {name}");
            return Ok(None);
        }
        self.write_lines(name, entries).map(Some)
    }

    fn write_lines<I>(&self, name: &str, entries: I) -> Result<Utf8PathBuf>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let path = self.report_path(name);
        let to_report_error = |source: std::io::Error| AuditError::WriteReport {
            path: path.clone(),
            source,
        };

        let mut writer = BufWriter::new(File::create(&path).map_err(to_report_error)?);
        let mut count = 0usize;
        for entry in entries {
            writeln!(writer, "{entry}").map_err(to_report_error)?;
            count += 1;
        }
        writer.flush().map_err(to_report_error)?;

        debug!("wrote {count} entries to {path}");
        Ok(path)
    }
}
