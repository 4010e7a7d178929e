//! Shared test utilities for building mirrors and authoritative lists.

use camino::{Utf8Path, Utf8PathBuf};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use tempfile::TempDir;

/// Computes the lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Creates a temporary directory and returns it with its UTF-8 path.
///
/// # Panics
///
/// Panics if the directory cannot be created or its path is not UTF-8.
pub fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 tempdir path");
    (dir, path)
}

/// Formats one authoritative row for `contents`.
pub fn files_txt_row(project: &str, version: &str, filename: &str, contents: &[u8]) -> String {
    format!("{project},{version},{filename},{}", sha256_hex(contents))
}

/// One file a [`MirrorLayout`] writes into the packages area.
#[derive(Debug, Clone)]
pub struct MirrorFile {
    /// Filename listed in the project index.
    pub filename: String,
    /// Bytes stored on disk.
    pub contents: Vec<u8>,
}

/// Declarative description of a mirror web directory for tests.
///
/// Files are stored the way bandersnatch lays them out,
/// `packages/<h[0..2]>/<h[2..4]>/<h[4..]>/<filename>`, and referenced from
/// the project index with a percent-encoded `../../packages/` URL.
#[derive(Debug, Clone, Default)]
pub struct MirrorLayout {
    projects: Vec<(String, Vec<MirrorFile>)>,
}

impl MirrorLayout {
    /// Creates an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists `name` in the project index, with no files yet.
    #[must_use]
    pub fn project(mut self, name: &str) -> Self {
        self.project_files(name);
        self
    }

    /// Adds a file to `project`, listing the project if needed.
    #[must_use]
    pub fn file(mut self, project: &str, filename: &str, contents: &[u8]) -> Self {
        self.project_files(project).push(MirrorFile {
            filename: filename.to_owned(),
            contents: contents.to_vec(),
        });
        self
    }

    fn project_files(&mut self, name: &str) -> &mut Vec<MirrorFile> {
        let position = match self.projects.iter().position(|(n, _)| n == name) {
            Some(position) => position,
            None => {
                self.projects.push((name.to_owned(), Vec::new()));
                self.projects.len() - 1
            }
        };
        &mut self.projects[position].1
    }

    /// Returns the storage path of `filename` with `contents` under `root`.
    pub fn storage_path(root: &Utf8Path, filename: &str, contents: &[u8]) -> Utf8PathBuf {
        root.join(Self::storage_relative(filename, contents))
    }

    fn storage_relative(filename: &str, contents: &[u8]) -> String {
        let hash = sha256_hex(contents);
        format!(
            "packages/{}/{}/{}/{filename}",
            &hash[..2],
            &hash[2..4],
            &hash[4..]
        )
    }

    /// Writes the index documents and package files below `root`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while creating directories or files.
    pub fn write_to(&self, root: &Utf8Path) -> io::Result<()> {
        let simple = root.join("simple");
        fs::create_dir_all(&simple)?;

        let projects: Vec<_> = self
            .projects
            .iter()
            .map(|(name, _)| json!({ "name": name, "_last-serial": 1 }))
            .collect();
        let index = json!({ "meta": { "api-version": "1.0" }, "projects": projects });
        fs::write(simple.join("index.v1_json"), index.to_string())?;

        for (name, files) in &self.projects {
            let mut entries = Vec::new();
            for file in files {
                let relative = Self::storage_relative(&file.filename, &file.contents);
                let storage = root.join(&relative);
                if let Some(parent) = storage.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&storage, &file.contents)?;

                let parent = relative
                    .strip_suffix(&file.filename)
                    .unwrap_or(relative.as_str());
                let encoded = utf8_percent_encode(&file.filename, NON_ALPHANUMERIC);
                entries.push(json!({
                    "filename": file.filename,
                    "hashes": { "sha256": sha256_hex(&file.contents) },
                    "requires-python": null,
                    "url": format!("../../{parent}{encoded}"),
                    "yanked": false,
                }));
            }
            let project_dir = simple.join(name);
            fs::create_dir_all(&project_dir)?;
            let project_index = json!({
                "meta": { "api-version": "1.0", "_last-serial": 1 },
                "name": name,
                "files": entries,
            });
            fs::write(project_dir.join("index.v1_json"), project_index.to_string())?;
        }
        Ok(())
    }
}
