//! Tests for the mirror index reader.

use super::*;
use crate::artifact::Artifact;
use crate::identity::PackageIdentity;
use crate::test_utils::{MirrorLayout, sha256_hex, utf8_tempdir};
use rstest::rstest;
use std::fs;

#[test]
fn reads_projects_and_resolves_storage_paths() {
    let (_dir, root) = utf8_tempdir();
    MirrorLayout::new()
        .file("Django_Rest", "django_rest-1.0.tar.gz", b"sdist")
        .file("Django_Rest", "django_rest-1.0-py3-none-any.whl", b"wheel")
        .write_to(&root)
        .expect("write mirror");

    let catalog = parse_web_dir(&root).expect("valid mirror");

    assert_eq!(catalog.len(), 1);
    let inventory = catalog
        .get(&PackageIdentity::new("django-rest"))
        .expect("project present");
    assert_eq!(inventory.name(), "Django_Rest");
    assert_eq!(inventory.len(), 2);
    assert_eq!(inventory.versions().count(), 0);

    let sdist = inventory.file("django_rest-1.0.tar.gz").expect("sdist listed");
    assert_eq!(sdist.sha256(), sha256_hex(b"sdist"));
    let expected = MirrorLayout::storage_path(&root, "django_rest-1.0.tar.gz", b"sdist");
    assert_eq!(sdist.path(), expected.as_path());
    assert!(sdist.path().exists());
}

#[test]
fn projects_without_files_are_kept() {
    let (_dir, root) = utf8_tempdir();
    MirrorLayout::new()
        .project("abandoned")
        .write_to(&root)
        .expect("write mirror");

    let catalog = parse_web_dir(&root).expect("valid mirror");
    let inventory = catalog
        .get(&PackageIdentity::new("abandoned"))
        .expect("project present");
    assert!(inventory.is_empty());
}

#[test]
fn missing_root_index_names_the_file() {
    let (_dir, root) = utf8_tempdir();
    let err = parse_web_dir(&root).expect_err("no index");
    match err {
        AuditError::ReadIndex { path, .. } => {
            assert_eq!(path, root.join("simple").join("index.v1_json"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_project_index_is_fatal() {
    let (_dir, root) = utf8_tempdir();
    MirrorLayout::new()
        .project("broken")
        .write_to(&root)
        .expect("write mirror");
    fs::write(root.join("simple/broken/index.v1_json"), "{\"files\": [{}]}")
        .expect("overwrite index");

    let err = parse_web_dir(&root).expect_err("malformed index");
    assert!(matches!(err, AuditError::ParseIndex { .. }));
}

#[rstest]
#[case::uppercase("AB".repeat(32))]
#[case::short("abc".to_owned())]
#[case::non_hex("z".repeat(64))]
fn malformed_mirror_digest_is_kept_verbatim(#[case] declared: String) {
    let (_dir, root) = utf8_tempdir();
    MirrorLayout::new()
        .project("odd")
        .write_to(&root)
        .expect("write mirror");
    let index = serde_json::json!({
        "files": [{
            "filename": "odd-1.0.tar.gz",
            "hashes": { "sha256": &declared },
            "url": "../../packages/ab/cd/odd-1.0.tar.gz",
        }]
    });
    fs::write(root.join("simple/odd/index.v1_json"), index.to_string())
        .expect("overwrite index");

    let catalog = parse_web_dir(&root).expect("digest text is not validated");
    let inventory = catalog
        .get(&PackageIdentity::new("odd"))
        .expect("project present");
    let artifact = inventory.file("odd-1.0.tar.gz").expect("file listed");
    assert_eq!(artifact.sha256(), declared);
}

#[test]
fn foreign_url_in_index_aborts_the_parse() {
    let (_dir, root) = utf8_tempdir();
    MirrorLayout::new()
        .project("remote")
        .write_to(&root)
        .expect("write mirror");
    let index = serde_json::json!({
        "files": [{
            "filename": "remote-1.0.tar.gz",
            "hashes": { "sha256": "0".repeat(64) },
            "url": "https://files.example.invalid/remote-1.0.tar.gz",
        }]
    });
    fs::write(root.join("simple/remote/index.v1_json"), index.to_string())
        .expect("overwrite index");

    let err = parse_web_dir(&root).expect_err("foreign URL");
    match err {
        AuditError::UnexpectedFileUrl { project, url, .. } => {
            assert_eq!(project, "remote");
            assert_eq!(url, "https://files.example.invalid/remote-1.0.tar.gz");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
#[case::plain("../../packages/a/b/pkg-1.0.tar.gz", "/web/packages/a/b/pkg-1.0.tar.gz")]
#[case::encoded_plus("../../packages/a/pkg-1.0%2Blocal.whl", "/web/packages/a/pkg-1.0+local.whl")]
#[case::encoded_space("../../packages/a/my%20pkg.zip", "/web/packages/a/my pkg.zip")]
fn resolves_relative_urls(#[case] url: &str, #[case] expected: &str) {
    let path = resolve_file_url(Utf8Path::new("/web"), "pkg", url).expect("valid URL");
    assert_eq!(path, Utf8PathBuf::from(expected));
}

#[rstest]
#[case::absolute("https://example.invalid/packages/pkg.tar.gz")]
#[case::one_level_up("../packages/pkg.tar.gz")]
#[case::encoded_prefix("..%2F..%2Fpackages/pkg.tar.gz")]
#[case::traversal("../../packages/../../etc/passwd")]
#[case::encoded_traversal("../../packages/%2E%2E/%2E%2E/etc/passwd")]
#[case::invalid_utf8("../../packages/%FF.tar.gz")]
fn rejects_urls_outside_packages(#[case] url: &str) {
    let err = resolve_file_url(Utf8Path::new("/web"), "pkg", url).expect_err("rejected URL");
    assert!(matches!(err, AuditError::UnexpectedFileUrl { .. }));
}
