//! Bandersnatch mirror audit library.
//!
//! This crate reconciles an authoritative list of package files against the
//! JSON indexes of a bandersnatch mirror and verifies the files on disk.
//!
//! # Modules
//!
//! - [`authoritative`]: parse the `project,version,filename,sha256` list
//! - [`mirror`]: read `simple/` indexes and resolve storage paths
//! - [`identity`]: normalized package names
//! - [`catalog`]: per-package inventories shared by both sources
//! - [`reconcile`]: package and file discrepancies
//! - [`verify`]: existence and SHA-256 checks with progress output
//! - [`report`]: report files
//! - [`audit`]: the end-to-end pipeline
//! - [`cli`] and [`config`]: command line and configuration file

pub mod artifact;
pub mod audit;
pub mod authoritative;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod mirror;
pub mod progress;
pub mod reconcile;
pub mod report;
pub mod sha256_digest;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod verify;
