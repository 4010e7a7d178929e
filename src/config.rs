//! Optional TOML configuration and the merged settings of a run.
//!
//! `AuditConfig` mirrors the command-line switches that are worth pinning
//! for a scheduled audit. Every field is optional; omitted values fall back to
//! the same defaults the command line uses. Command-line flags always win
//! over the file.

use crate::error::{AuditError, Result};
use crate::progress::DEFAULT_PROGRESS_INTERVAL;
use crate::verify::VerificationPolicy;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Settings read from an audit configuration file.
///
/// # Examples
///
/// ```
/// use bandersnatch_audit::config::AuditConfig;
///
/// let config: AuditConfig = toml::from_str("check_hashes = true\n").expect("valid config");
/// assert!(config.check_hashes);
/// assert_eq!(config.progress_interval_secs, 2);
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Recompute content hashes of every verified file.
    pub check_hashes: bool,
    /// Only audit projects whose raw name matches this regular expression.
    pub regex: Option<String>,
    /// Directory that receives the report files.
    pub output_dir: Option<Utf8PathBuf>,
    /// Minimum number of seconds between two progress lines.
    pub progress_interval_secs: u64,
}

impl AuditConfig {
    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::ReadConfig`] if the file cannot be read and
    /// [`AuditError::InvalidConfig`] if it is not valid configuration TOML.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|source| AuditError::ReadConfig {
            path: path.to_owned(),
            source,
        })?;
        let config = toml::from_str(&source).map_err(|source| AuditError::InvalidConfig {
            path: path.to_owned(),
            source,
        })?;
        debug!("loaded configuration from {path}");
        Ok(config)
    }

    /// The configured progress interval as a [`Duration`].
    #[must_use]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            check_hashes: false,
            regex: None,
            output_dir: None,
            progress_interval_secs: DEFAULT_PROGRESS_INTERVAL.as_secs(),
        }
    }
}

/// Everything a single audit run needs to know.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditSettings {
    /// Root of the mirror's web directory.
    pub web_dir: Utf8PathBuf,
    /// The authoritative `files.txt` list.
    pub files_txt: Utf8PathBuf,
    /// Optional project-name inclusion filter.
    pub regex: Option<String>,
    /// How thoroughly files are verified.
    pub policy: VerificationPolicy,
    /// Where report files are written.
    pub output_dir: Utf8PathBuf,
    /// Minimum gap between progress lines.
    pub progress_interval: Duration,
}

impl AuditSettings {
    /// Settings for auditing `web_dir` against `files_txt` with defaults:
    /// no filter, existence checks only, reports in the current directory.
    #[must_use]
    pub fn new(web_dir: impl Into<Utf8PathBuf>, files_txt: impl Into<Utf8PathBuf>) -> Self {
        Self::from_config(web_dir, files_txt, &AuditConfig::default())
    }

    /// Settings seeded from `config`.
    #[must_use]
    pub fn from_config(
        web_dir: impl Into<Utf8PathBuf>,
        files_txt: impl Into<Utf8PathBuf>,
        config: &AuditConfig,
    ) -> Self {
        let policy = if config.check_hashes {
            VerificationPolicy::with_hashes()
        } else {
            VerificationPolicy::existence_only()
        };
        Self {
            web_dir: web_dir.into(),
            files_txt: files_txt.into(),
            regex: config.regex.clone(),
            policy,
            output_dir: config
                .output_dir
                .clone()
                .unwrap_or_else(|| Utf8PathBuf::from(".")),
            progress_interval: config.progress_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::utf8_tempdir;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_the_command_line() {
        let config = AuditConfig::default();

        assert!(!config.check_hashes);
        assert!(config.regex.is_none());
        assert!(config.output_dir.is_none());
        assert_eq!(config.progress_interval(), Duration::from_secs(2));
    }

    #[rstest]
    fn deserialises_every_field() {
        let source = concat!(
            "check_hashes = true\n",
            "regex = \"^numpy$\"\n",
            "output_dir = \"reports\"\n",
            "progress_interval_secs = 10\n",
        );

        let config = toml::from_str::<AuditConfig>(source)
            .expect("expected configuration to parse successfully");

        assert!(config.check_hashes);
        assert_eq!(config.regex.as_deref(), Some("^numpy$"));
        assert_eq!(config.output_dir, Some(Utf8PathBuf::from("reports")));
        assert_eq!(config.progress_interval_secs, 10);
    }

    #[rstest]
    fn omitted_fields_fall_back_to_defaults() {
        let config = toml::from_str::<AuditConfig>("regex = \"^a\"\n")
            .expect("expected configuration to parse successfully");

        assert!(!config.check_hashes);
        assert_eq!(config.progress_interval_secs, 2);
    }

    #[rstest]
    #[case::unknown_field("verbose = true\n")]
    #[case::wrong_type("check_hashes = \"yes\"\n")]
    #[case::negative_interval("progress_interval_secs = -1\n")]
    fn rejects_invalid_documents(#[case] source: &str) {
        let outcome: std::result::Result<AuditConfig, _> = toml::from_str(source);
        assert!(outcome.is_err(), "expected {source:?} to be rejected");
    }

    #[rstest]
    fn load_reads_a_file() {
        let (_dir, root) = utf8_tempdir();
        let path = root.join("audit.toml");
        fs::write(&path, "check_hashes = true\n").expect("write config");

        let config = AuditConfig::load(&path).expect("load config");

        assert!(config.check_hashes);
    }

    #[rstest]
    fn load_reports_missing_files() {
        let (_dir, root) = utf8_tempdir();
        let path = root.join("absent.toml");

        let err = AuditConfig::load(&path).expect_err("missing config");

        assert!(matches!(err, AuditError::ReadConfig { path: p, .. } if p == path));
    }

    #[rstest]
    fn load_reports_invalid_toml() {
        let (_dir, root) = utf8_tempdir();
        let path = root.join("audit.toml");
        fs::write(&path, "check_hashes = \n").expect("write config");

        let err = AuditConfig::load(&path).expect_err("invalid config");

        assert!(matches!(err, AuditError::InvalidConfig { .. }));
        assert!(err.to_string().contains("audit.toml"));
    }

    #[rstest]
    fn settings_follow_the_config() {
        let config = AuditConfig {
            check_hashes: true,
            regex: Some("^django".to_owned()),
            output_dir: Some(Utf8PathBuf::from("/var/reports")),
            progress_interval_secs: 0,
        };

        let settings = AuditSettings::from_config("/srv/web", "/srv/files.txt", &config);

        assert_eq!(settings.web_dir, Utf8PathBuf::from("/srv/web"));
        assert_eq!(settings.files_txt, Utf8PathBuf::from("/srv/files.txt"));
        assert!(settings.policy.check_hashes());
        assert_eq!(settings.regex.as_deref(), Some("^django"));
        assert_eq!(settings.output_dir, Utf8PathBuf::from("/var/reports"));
        assert_eq!(settings.progress_interval, Duration::ZERO);
    }

    #[rstest]
    fn default_settings_write_to_the_current_directory() {
        let settings = AuditSettings::new("web", "files.txt");

        assert_eq!(settings.output_dir, Utf8PathBuf::from("."));
        assert!(!settings.policy.check_hashes());
        assert!(settings.regex.is_none());
    }
}
