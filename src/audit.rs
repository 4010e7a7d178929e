//! End-to-end audit of a mirror against its authoritative list.
//!
//! [`run_audit`] is the whole pipeline: parse both sources, reconcile them,
//! write the package reports, verify every file the mirror should hold, then
//! write the file reports. Console messages go to the supplied writer;
//! diagnostics go through the `log` facade.

use crate::authoritative::{parse_files_txt, project_name_filter};
use crate::config::AuditSettings;
use crate::error::Result;
use crate::identity::PackageIdentity;
use crate::mirror::parse_web_dir;
use crate::reconcile::{Reconciliation, reconcile};
use crate::report::{
    BAD_FILES_REPORT, MISSING_PACKAGES_REPORT, ReportWriter, UNEXPECTED_PACKAGES_REPORT,
};
use crate::verify::{ScanSummary, VerificationScanner};
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::collections::BTreeSet;
use std::io::Write;

/// Outcome of a completed audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSummary {
    /// Package and file discrepancies.
    pub reconciliation: Reconciliation,
    /// Result of the verification pass.
    pub scan: ScanSummary,
    /// Every report file written, in the order written.
    pub reports: Vec<Utf8PathBuf>,
}

impl AuditSummary {
    /// Whether the mirror matches the authoritative list exactly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        let r = &self.reconciliation;
        r.missing_packages.is_empty()
            && r.unexpected_with_files.is_empty()
            && r.missing_files.is_empty()
            && r.unexpected_files.is_empty()
            && self.scan.failures.is_empty()
    }
}

/// Audit the mirror described by `settings`, printing progress to `out`.
///
/// Discrepancies are not errors: they are written to the report files and
/// returned in the summary.
///
/// # Errors
///
/// Returns an error if the filter regex is invalid, either source cannot be
/// read or parsed, an existing file cannot be read during verification, or
/// a report cannot be written.
pub fn run_audit(settings: &AuditSettings, out: &mut dyn Write) -> Result<AuditSummary> {
    let filter = settings
        .regex
        .as_deref()
        .map(project_name_filter)
        .transpose()?;
    let writer = ReportWriter::new(settings.output_dir.clone());
    writer.prepare()?;

    write!(out, "Parsing CSV Packages...")?;
    out.flush()?;
    let authoritative = parse_files_txt(&settings.files_txt, filter.as_deref())?;
    writeln!(out, "Done")?;

    write!(out, "Parsing Bandersnatch Packages...")?;
    out.flush()?;
    let mirror = parse_web_dir(&settings.web_dir)?;
    writeln!(out, "Done")?;

    info!(
        "reconciling {} declared packages against {} mirrored packages",
        authoritative.len(),
        mirror.len()
    );
    let reconciliation = reconcile(&authoritative, &mirror);
    let mut reports = Vec::new();

    writeln!(
        out,
        "There are {} packages missing from bandersnatch",
        reconciliation.missing_packages.len()
    )?;
    echo_identities(out, &reconciliation.missing_packages)?;
    writeln!(
        out,
        "There are {} unexpected packages in bandersnatch",
        reconciliation.unexpected_packages.len()
    )?;
    writeln!(
        out,
        "Of those {} have files",
        reconciliation.unexpected_with_files.len()
    )?;
    echo_identities(out, &reconciliation.unexpected_with_files)?;
    writeln!(out, "There are {} in both sets", reconciliation.in_both.len())?;
    writer.write_package_reports(&reconciliation)?;
    reports.push(writer.report_path(MISSING_PACKAGES_REPORT));
    reports.push(writer.report_path(UNEXPECTED_PACKAGES_REPORT));

    writeln!(
        out,
        "Preparing to check {} files",
        reconciliation.files_to_verify.len()
    )?;
    info!("verifying files with {}", settings.policy);
    let scan = VerificationScanner::new(settings.policy)
        .with_progress_interval(settings.progress_interval)
        .scan(&reconciliation.files_to_verify, out)?;
    reports.push(writer.write_bad_files(&scan.failures)?);
    writeln!(out, "Completed checking files")?;
    writeln!(
        out,
        "There are {} missing or corrupted files",
        scan.failure_count()
    )?;
    if scan.failure_count() > 0 {
        writeln!(out, "See {BAD_FILES_REPORT}")?;
    }

    writeln!(
        out,
        "There are {} files missing from bandersnatch",
        reconciliation.missing_files.len()
    )?;
    if let Some(path) = writer.write_missing_files(&reconciliation)? {
        writeln!(out, "See {}", report_name(&path))?;
        reports.push(path);
    }
    writeln!(
        out,
        "There are {} unexpected files in bandersnatch",
        reconciliation.unexpected_files.len()
    )?;
    if let Some(path) = writer.write_unexpected_files(&reconciliation)? {
        writeln!(out, "See {}", report_name(&path))?;
        reports.push(path);
    }

    Ok(AuditSummary {
        reconciliation,
        scan,
        reports,
    })
}

fn echo_identities(out: &mut dyn Write, identities: &BTreeSet<PackageIdentity>) -> Result<()> {
    for identity in identities {
        writeln!(out, "{identity:?}")?;
    }
    Ok(())
}

fn report_name(path: &Utf8Path) -> &str {
    path.file_name().unwrap_or(path.as_str())
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
