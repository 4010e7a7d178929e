//! Error types for the mirror audit.
//!
//! Every fatal condition of a run is a variant of [`AuditError`]. Per-file
//! verification failures are not errors; they are collected by the scanner
//! and reported in `bad_files.txt`.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A line of the authoritative list does not have the
    /// `project,version,filename,sha256` shape.
    #[error("error parsing line {line_number}: >{line}<")]
    MalformedRow {
        /// 1-based line number within the authoritative list.
        line_number: usize,
        /// The offending line, trailing whitespace removed.
        line: String,
    },

    /// A mirror file entry points outside the shared packages area.
    #[error("unexpected file URL \"{url}\" in project {project}: {reason}")]
    UnexpectedFileUrl {
        /// Raw name of the project whose index lists the file.
        project: String,
        /// The URL exactly as it appears in the index.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// A SHA-256 digest is not a 64-character lowercase hex string.
    #[error("invalid SHA-256 digest \"{value}\": {reason}")]
    InvalidSha256Digest {
        /// The rejected digest text.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// The project-name filter is not a valid regular expression.
    #[error("invalid project filter regex: {source}")]
    InvalidRegex {
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The authoritative list could not be opened.
    #[error("failed to open authoritative list {path}: {source}")]
    ReadFilesTxt {
        /// Path of the authoritative list.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A mirror index document could not be read.
    #[error("failed to read index {path}: {source}")]
    ReadIndex {
        /// Path of the index document.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A mirror index document is not valid JSON of the expected shape.
    #[error("failed to parse index {path}: {source}")]
    ParseIndex {
        /// Path of the index document.
        path: Utf8PathBuf,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::config::AuditConfig`].
    #[error("invalid config file {path}: {source}")]
    InvalidConfig {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A report file could not be written.
    #[error("failed to write report {path}: {source}")]
    WriteReport {
        /// Path of the report file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`AuditError`].
pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_row_echoes_line_content() {
        let err = AuditError::MalformedRow {
            line_number: 3,
            line: "numpy,1.0,numpy-1.0.tar.gz".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains(">numpy,1.0,numpy-1.0.tar.gz<"));
    }

    #[test]
    fn unexpected_file_url_names_project_and_url() {
        let err = AuditError::UnexpectedFileUrl {
            project: "requests".to_owned(),
            url: "https://example.invalid/requests.whl".to_owned(),
            reason: "expected prefix ../../packages/".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("requests"));
        assert!(msg.contains("https://example.invalid/requests.whl"));
    }

    #[test]
    fn read_index_preserves_source() {
        let err = AuditError::ReadIndex {
            path: Utf8PathBuf::from("/mirror/simple/index.v1_json"),
            source: std::io::Error::other("no such file"),
        };
        assert!(err.to_string().contains("/mirror/simple/index.v1_json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
