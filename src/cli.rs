//! CLI argument definitions for the mirror audit.
//!
//! This module defines the command-line interface using clap and merges it
//! with the optional configuration file. It is separated from the entrypoint
//! so the binary stays focused on orchestration.

use crate::config::{AuditConfig, AuditSettings};
use crate::error::Result;
use crate::verify::VerificationPolicy;
use camino::Utf8PathBuf;
use clap::Parser;

/// Audit a bandersnatch mirror against an authoritative file list.
#[derive(Parser, Debug, Default)]
#[command(name = "bandersnatch-audit")]
#[command(version, about)]
#[command(long_about = concat!(
    "Audit a bandersnatch mirror against an authoritative file list.\n\n",
    "The list holds one `project,version,filename,sha256` row per line. The mirror ",
    "is read from its `simple/` JSON indexes. Packages and files present on only one ",
    "side are written to report files, and every file the mirror should hold is ",
    "checked for existence (and, with --check-hashes, for integrity).\n\n",
    "Discrepancies do not change the exit status; only fatal errors do.",
))]
#[command(after_help = concat!(
    "REPORTS:\n",
    "  bandersnatch_missing_packages.txt     Declared packages absent from the mirror\n",
    "  bandersnatch_unexpected_packages.txt  Undeclared mirror packages with files\n",
    "  bad_files.txt                         Files that are missing or corrupted\n",
    "  bandersnatch_missing_files.txt        Declared files absent from the mirror\n",
    "  bandersnatch_unexpected_files.txt     Undeclared files in the mirror\n\n",
    "EXAMPLES:\n",
    "  Check that every file exists:\n",
    "    $ bandersnatch-audit /srv/pypi/web files.txt\n\n",
    "  Verify hashes of the numpy family only:\n",
    "    $ bandersnatch-audit -c -r '^numpy' /srv/pypi/web files.txt\n\n",
    "  Use a configuration file and write reports elsewhere:\n",
    "    $ bandersnatch-audit --config audit.toml -o reports /srv/pypi/web files.txt",
))]
pub struct Cli {
    /// Mirror web directory (the parent of `simple/` and `packages/`).
    #[arg(value_name = "WEB_DIR")]
    pub web_dir: Utf8PathBuf,

    /// Authoritative list of files that should be mirrored.
    #[arg(value_name = "FILES_TXT")]
    pub files_txt: Utf8PathBuf,

    /// Only audit projects whose name matches this regular expression.
    #[arg(short, long, value_name = "REGEX")]
    pub regex: Option<String>,

    /// Recompute and compare the SHA-256 of every mirrored file.
    #[arg(short = 'c', long)]
    pub check_hashes: bool,

    /// Directory for report files [default: current directory].
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Read defaults from this TOML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Increase diagnostic log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Load the configuration file named by `--config`, or the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load_config(&self) -> Result<AuditConfig> {
        match &self.config {
            Some(path) => AuditConfig::load(path),
            None => Ok(AuditConfig::default()),
        }
    }

    /// Merge the command line over `config`.
    ///
    /// `--check-hashes` can only turn checking on; `--regex` and
    /// `--output-dir` replace configured values.
    #[must_use]
    pub fn settings(&self, config: &AuditConfig) -> AuditSettings {
        let mut settings =
            AuditSettings::from_config(self.web_dir.clone(), self.files_txt.clone(), config);
        if self.check_hashes {
            settings.policy = VerificationPolicy::with_hashes();
        }
        if let Some(regex) = &self.regex {
            settings.regex = Some(regex.clone());
        }
        if let Some(output_dir) = &self.output_dir {
            settings.output_dir = output_dir.clone();
        }
        settings
    }

    /// Default log filter directive for the requested verbosity.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
