use super::*;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread;

use hudpack_core::{
    Error, ErrorKind, HudpackConfig, InstallerConfig, NetworkConfig, UpdateDecision,
    INSTALLER_VERSION,
};
use tempfile::TempDir;

use crate::archive::entry_destination;

const ARCHIVE_URL: &str = "https://example.test/hud/master.zip";
const VERSION_URL: &str = "https://example.test/hud/version.txt";
const INSTALLER_URL: &str = "https://example.test/hudpack";
const INSTALLER_VERSION_URL: &str = "https://example.test/hudpack.txt";

enum Entry<'a> {
    Dir(&'a str),
    File(&'a str, &'a [u8]),
}

fn zip_bytes(entries: &[Entry<'_>]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    for entry in entries {
        match entry {
            Entry::Dir(name) => writer
                .add_directory(*name, options)
                .expect("must add directory"),
            Entry::File(name, bytes) => {
                writer.start_file(*name, options).expect("must start file");
                writer.write_all(bytes).expect("must write file");
            }
        }
    }
    writer.finish().expect("must finish zip").into_inner()
}

fn hud_archive(version: &str) -> Vec<u8> {
    zip_bytes(&[
        Entry::Dir("RebelHud-master/"),
        Entry::File("RebelHud-master/README.md", b"readme"),
        Entry::Dir("RebelHud-master/custom/"),
        Entry::Dir("RebelHud-master/custom/RebelHud/"),
        Entry::File(
            "RebelHud-master/custom/RebelHud/version.txt",
            format!("{version}\n").as_bytes(),
        ),
        Entry::Dir("RebelHud-master/custom/RebelHud/resource/"),
        Entry::File(
            "RebelHud-master/custom/RebelHud/resource/hudlayout.res",
            b"layout",
        ),
    ])
}

/// Serves canned bodies by URL and records every request.
#[derive(Default)]
struct MemoryFetcher {
    resources: RefCell<HashMap<String, Vec<u8>>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    fn serve(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.resources
            .borrow_mut()
            .insert(url.to_string(), body.into());
    }

    fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch_to_file(&self, url: &str, destination: &Path) -> hudpack_core::Result<u64> {
        self.requests.borrow_mut().push(url.to_string());
        let Some(body) = self.resources.borrow().get(url).cloned() else {
            return Err(Error::fetch(
                "failed to open download",
                url,
                destination,
                io::Error::new(io::ErrorKind::NotFound, "404"),
            ));
        };
        fs::write(destination, &body)
            .map_err(|err| Error::fetch("failed to write", url, destination, err))?;
        Ok(body.len() as u64)
    }

    fn read_text(&self, url: &str) -> hudpack_core::Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        match self.resources.borrow().get(url) {
            Some(body) => Ok(String::from_utf8_lossy(body).into_owned()),
            None => Err(Error::network(
                "failed to read remote version",
                url,
                io::Error::new(io::ErrorKind::ConnectionRefused, "offline"),
            )),
        }
    }
}

fn test_config() -> HudpackConfig {
    HudpackConfig::from_toml_str(&format!(
        "[package]\narchive_url = \"{ARCHIVE_URL}\"\nversion_url = \"{VERSION_URL}\"\n"
    ))
    .expect("config must parse")
}

fn installer_endpoints() -> InstallerConfig {
    InstallerConfig {
        download_url: INSTALLER_URL.to_string(),
        version_url: INSTALLER_VERSION_URL.to_string(),
    }
}

struct Fixture {
    root: TempDir,
    fetcher: MemoryFetcher,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("must create temp dir");
        fs::create_dir_all(root.path().join("custom")).expect("must create host dir");
        Self {
            root,
            fetcher: MemoryFetcher::default(),
        }
    }

    fn install_path(&self) -> PathBuf {
        self.root.path().join("custom")
    }

    fn orchestrator(&self) -> InstallOrchestrator<&MemoryFetcher> {
        InstallOrchestrator::new(
            test_config(),
            vec![self.root.path().join("missing"), self.install_path()],
            &self.fetcher,
        )
    }

    fn marker(&self) -> PathBuf {
        self.install_path().join("RebelHud").join("version.txt")
    }

    fn seed_installed(&self, version: &str) {
        let package_dir = self.install_path().join("RebelHud");
        fs::create_dir_all(&package_dir).expect("must create package dir");
        fs::write(package_dir.join("version.txt"), format!("{version}\n"))
            .expect("must write marker");
        fs::write(package_dir.join("hudlayout.res"), b"old layout").expect("must write file");
    }
}

#[test]
fn locate_returns_first_existing_directory() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let a = root.path().join("a");
    let b = root.path().join("b");
    let c = root.path().join("c");
    fs::create_dir_all(&a).expect("must create a");
    fs::create_dir_all(&b).expect("must create b");

    let found = locate("host", &[a.clone(), b.clone(), c.clone()]).expect("must locate");
    assert_eq!(found, a);

    let found = locate("host", &[c.clone(), b.clone(), a.clone()]).expect("must locate");
    assert_eq!(found, b);
}

#[test]
fn locate_skips_plain_files_and_reports_all_candidates() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let file = root.path().join("file");
    fs::write(&file, b"not a dir").expect("must write file");
    let missing = root.path().join("missing");

    let err = locate("Team Fortress 2", &[file.clone(), missing.clone()])
        .expect_err("no directory exists");
    assert_eq!(err.kind(), ErrorKind::EnvironmentNotFound);
    match err {
        Error::EnvironmentNotFound { host, candidates } => {
            assert_eq!(host, "Team Fortress 2");
            assert_eq!(candidates, vec![file, missing]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = locate("host", &[]).expect_err("empty list cannot match");
    assert_eq!(err.kind(), ErrorKind::EnvironmentNotFound);
}

#[test]
fn layout_paths_follow_package_config() {
    let config = test_config();
    let layout = InstallLayout::new("/games/tf/custom", &config.package);
    assert_eq!(layout.package_dir(), PathBuf::from("/games/tf/custom/RebelHud"));
    assert_eq!(
        layout.marker_path(),
        PathBuf::from("/games/tf/custom/RebelHud/version.txt")
    );
    assert_eq!(layout.archive_path(), PathBuf::from("/games/tf/custom/dl.zip"));
    assert_eq!(layout.staging_dir(), PathBuf::from("/games/tf/custom/temp"));
    assert_eq!(
        layout.deploy_source_dir(),
        PathBuf::from("/games/tf/custom/temp/RebelHud-master/custom")
    );
}

#[test]
fn extract_directory_then_file_round_trip() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let archive = root.path().join("pkg.zip");
    fs::write(
        &archive,
        zip_bytes(&[Entry::Dir("x/"), Entry::File("x/a.txt", b"hello")]),
    )
    .expect("must write archive");

    let dest = root.path().join("out");
    let summary = extract_zip(&archive, &dest).expect("must extract");
    assert_eq!(summary, ExtractSummary { directories: 1, files: 1 });
    assert!(dest.join("x").is_dir());
    assert_eq!(
        fs::read_to_string(dest.join("x").join("a.txt")).expect("must read"),
        "hello"
    );
}

#[test]
fn extract_creates_parents_for_undeclared_directories() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let archive = root.path().join("pkg.zip");
    fs::write(
        &archive,
        zip_bytes(&[
            Entry::File("deep/nested/file.txt", b"nested"),
            Entry::File("/rooted.txt", b"rooted"),
        ]),
    )
    .expect("must write archive");

    let dest = root.path().join("out");
    fs::create_dir_all(&dest).expect("existing destination is fine");
    extract_zip(&archive, &dest).expect("must extract");
    assert_eq!(
        fs::read_to_string(dest.join("deep/nested/file.txt")).expect("must read"),
        "nested"
    );
    assert_eq!(
        fs::read_to_string(dest.join("rooted.txt")).expect("must read"),
        "rooted"
    );
}

#[test]
fn extract_overwrites_existing_files() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let archive = root.path().join("pkg.zip");
    fs::write(&archive, zip_bytes(&[Entry::File("a.txt", b"new")])).expect("must write archive");
    let dest = root.path().join("out");
    fs::create_dir_all(&dest).expect("must create dest");
    fs::write(dest.join("a.txt"), b"old and longer").expect("must seed file");

    extract_zip(&archive, &dest).expect("must extract");
    assert_eq!(fs::read_to_string(dest.join("a.txt")).expect("must read"), "new");
}

#[test]
fn extract_rejects_malformed_archive() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let archive = root.path().join("broken.zip");
    fs::write(&archive, b"this is not a zip file").expect("must write archive");

    let err = extract_zip(&archive, &root.path().join("out")).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Archive);
    assert!(err.to_string().contains("malformed archive"), "{err}");
}

#[test]
fn extract_reports_missing_archive() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let err = extract_zip(&root.path().join("absent.zip"), &root.path().join("out"))
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Archive);
}

#[test]
fn entry_names_are_joined_without_sanitizing_parent_segments() {
    let dest = Path::new("/dest");
    assert_eq!(entry_destination(dest, "x/a.txt"), PathBuf::from("/dest/x/a.txt"));
    assert_eq!(entry_destination(dest, "/abs.txt"), PathBuf::from("/dest/abs.txt"));
    assert_eq!(entry_destination(dest, "x//y/"), PathBuf::from("/dest/x/y"));
    assert_eq!(
        entry_destination(dest, "../escape.txt"),
        PathBuf::from("/dest/../escape.txt")
    );
}

#[test]
fn remove_path_deletes_nested_tree_and_is_idempotent() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let tree = root.path().join("tree");
    fs::create_dir_all(tree.join("a/b/c")).expect("must create dirs");
    fs::create_dir_all(tree.join("empty")).expect("must create dirs");
    fs::write(tree.join("top.txt"), b"1").expect("must write");
    fs::write(tree.join("a/one.txt"), b"1").expect("must write");
    fs::write(tree.join("a/b/c/two.txt"), b"2").expect("must write");

    let report = remove_path(&tree);
    assert!(report.is_clean(), "failed: {:?}", report.failed);
    assert_eq!(report.removed, 8);
    assert!(!tree.exists());

    let again = remove_path(&tree);
    assert_eq!(again, CleanReport::default());
}

#[test]
fn remove_path_deletes_single_file() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let file = root.path().join("dl.zip");
    fs::write(&file, b"zip").expect("must write");

    let report = remove_path(&file);
    assert_eq!(report.removed, 1);
    assert!(!file.exists());
    assert!(root.path().exists());
}

#[cfg(unix)]
#[test]
fn remove_path_does_not_follow_symlinks() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let outside = root.path().join("outside");
    fs::create_dir_all(&outside).expect("must create outside");
    fs::write(outside.join("keep.txt"), b"keep").expect("must write");

    let tree = root.path().join("tree");
    fs::create_dir_all(&tree).expect("must create tree");
    std::os::unix::fs::symlink(&outside, tree.join("link")).expect("must link");

    let report = remove_path(&tree);
    assert!(report.is_clean());
    assert!(!tree.exists());
    assert!(outside.join("keep.txt").exists());
}

#[test]
fn deploy_overwrites_and_keeps_unrelated_files() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let src = root.path().join("src");
    let dst = root.path().join("dst");
    fs::create_dir_all(src.join("RebelHud/resource")).expect("must create src");
    fs::write(src.join("RebelHud/version.txt"), b"1.2").expect("must write");
    fs::write(src.join("RebelHud/resource/ui.res"), b"ui").expect("must write");
    fs::create_dir_all(dst.join("RebelHud")).expect("must create dst");
    fs::write(dst.join("RebelHud/version.txt"), b"1.0").expect("must write");
    fs::write(dst.join("RebelHud/user.cfg"), b"mine").expect("must write");
    fs::write(dst.join("other.vpk"), b"other").expect("must write");

    let summary = deploy_dir(&src, &dst).expect("must deploy");
    assert_eq!(summary, DeploySummary { directories: 2, files: 2 });
    assert_eq!(
        fs::read_to_string(dst.join("RebelHud/version.txt")).expect("must read"),
        "1.2"
    );
    assert_eq!(
        fs::read_to_string(dst.join("RebelHud/resource/ui.res")).expect("must read"),
        "ui"
    );
    assert_eq!(
        fs::read_to_string(dst.join("RebelHud/user.cfg")).expect("must read"),
        "mine"
    );
    assert_eq!(fs::read_to_string(dst.join("other.vpk")).expect("must read"), "other");
}

#[test]
fn deploy_fails_when_source_is_missing() {
    let root = tempfile::tempdir().expect("must create temp dir");
    let err = deploy_dir(&root.path().join("absent"), root.path()).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Deploy);
}

#[test]
fn install_fetches_extracts_deploys_and_cleans_up() {
    let fixture = Fixture::new();
    fixture.fetcher.serve(ARCHIVE_URL, hud_archive("1.4"));
    fs::write(fixture.install_path().join("unrelated.txt"), b"keep").expect("must write");

    let mut orchestrator = fixture.orchestrator();
    assert_eq!(
        orchestrator.state().expect("must query"),
        InstallState::NotInstalled
    );

    let report = orchestrator.install().expect("install must succeed");
    assert_eq!(report.install_path, fixture.install_path());
    assert_eq!(report.deployed.files, 2);
    assert!(report.cleanup.is_clean());

    assert_eq!(
        orchestrator.state().expect("must query"),
        InstallState::Installed
    );
    assert_eq!(
        orchestrator
            .installed_version()
            .expect("must read version")
            .as_str(),
        "1.4"
    );
    assert_eq!(
        fs::read_to_string(fixture.marker()).expect("must read marker"),
        "1.4\n"
    );
    assert!(fixture
        .install_path()
        .join("RebelHud/resource/hudlayout.res")
        .is_file());
    assert!(fixture.install_path().join("unrelated.txt").is_file());
    assert!(!fixture.install_path().join("temp").exists());
    assert!(!fixture.install_path().join("dl.zip").exists());
    assert!(!fixture.install_path().join("README.md").exists());
    assert_eq!(fixture.fetcher.requests(), vec![ARCHIVE_URL.to_string()]);
}

#[test]
fn install_refuses_when_already_installed() {
    let fixture = Fixture::new();
    fixture.seed_installed("1.0");

    let err = fixture
        .orchestrator()
        .install()
        .expect_err("second install must fail");
    assert_eq!(err.kind(), ErrorKind::AlreadyInstalled);
    assert_eq!(err.to_string(), "RebelHud is already installed");
    assert!(fixture.fetcher.requests().is_empty());
}

#[test]
fn install_fails_without_host_directory() {
    let fixture = Fixture::new();
    let mut orchestrator = InstallOrchestrator::new(
        test_config(),
        vec![fixture.root.path().join("nope")],
        &fixture.fetcher,
    );
    let err = orchestrator.install().expect_err("no host directory");
    assert_eq!(err.kind(), ErrorKind::EnvironmentNotFound);
    assert!(err.to_string().starts_with("Team Fortress 2 could not be found"));
}

#[test]
fn failed_download_is_reported_as_fetch_error() {
    let fixture = Fixture::new();
    let err = fixture
        .orchestrator()
        .install()
        .expect_err("nothing is served");
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert!(!fixture.install_path().join("dl.zip").exists());
}

#[test]
fn failed_extraction_leaves_temp_artifacts_until_clean_up() {
    let fixture = Fixture::new();
    fixture.fetcher.serve(ARCHIVE_URL, b"corrupt".to_vec());

    let mut orchestrator = fixture.orchestrator();
    let err = orchestrator.install().expect_err("extraction must fail");
    assert_eq!(err.kind(), ErrorKind::Archive);
    assert!(fixture.install_path().join("dl.zip").exists());
    assert!(fixture.install_path().join("temp").is_dir());
    assert_eq!(
        orchestrator.state().expect("must query"),
        InstallState::NotInstalled
    );

    let report = orchestrator.clean_up().expect("clean up must succeed");
    assert!(report.is_clean());
    assert_eq!(report.removed, 2);
    assert!(!fixture.install_path().join("dl.zip").exists());
    assert!(!fixture.install_path().join("temp").exists());

    let again = orchestrator.clean_up().expect("clean up is idempotent");
    assert_eq!(again, CleanReport::default());
}

#[test]
fn archive_without_expected_subtree_fails_deploy() {
    let fixture = Fixture::new();
    fixture.fetcher.serve(
        ARCHIVE_URL,
        zip_bytes(&[Entry::File("wrong-root/version.txt", b"1.0")]),
    );

    let err = fixture
        .orchestrator()
        .install()
        .expect_err("deploy source is missing");
    assert_eq!(err.kind(), ErrorKind::Deploy);
    assert!(fixture.install_path().join("temp/wrong-root").is_dir());
}

#[test]
fn check_for_update_reports_same_version() {
    let fixture = Fixture::new();
    fixture.seed_installed("1.0");
    fixture.fetcher.serve(VERSION_URL, "1.0\n");

    let decision = fixture
        .orchestrator()
        .check_for_package_update()
        .expect("check must succeed");
    assert!(!decision.remote_is_newer);
    assert_eq!(decision.current.as_str(), "1.0");
    assert_eq!(decision.latest.as_str(), "1.0");
}

#[test]
fn check_for_update_reports_newer_remote() {
    let fixture = Fixture::new();
    fixture.seed_installed("1.0");
    fixture.fetcher.serve(VERSION_URL, "1.2");

    let decision = fixture
        .orchestrator()
        .check_for_package_update()
        .expect("check must succeed");
    assert!(decision.remote_is_newer);
    assert_eq!(decision.current.as_str(), "1.0");
    assert_eq!(decision.latest.as_str(), "1.2");
}

#[test]
fn check_for_update_requires_installed_package() {
    let fixture = Fixture::new();
    fixture.fetcher.serve(VERSION_URL, "1.2");

    let err = fixture
        .orchestrator()
        .check_for_package_update()
        .expect_err("not installed");
    assert_eq!(err.kind(), ErrorKind::NotInstalled);
    assert!(fixture.fetcher.requests().is_empty());
}

#[test]
fn check_for_update_surfaces_network_and_format_errors() {
    let fixture = Fixture::new();
    fixture.seed_installed("1.0");

    let err = fixture
        .orchestrator()
        .check_for_package_update()
        .expect_err("endpoint is offline");
    assert_eq!(err.kind(), ErrorKind::Network);

    fixture.fetcher.serve(VERSION_URL, "<html>oops</html>");
    let err = fixture
        .orchestrator()
        .check_for_package_update()
        .expect_err("body is not a version");
    assert_eq!(err.kind(), ErrorKind::VersionFormat);
}

#[test]
fn update_package_applies_confirmed_update() {
    let fixture = Fixture::new();
    fixture.seed_installed("1.0");
    fixture.fetcher.serve(VERSION_URL, "1.2");
    fixture.fetcher.serve(ARCHIVE_URL, hud_archive("1.2"));

    let mut orchestrator = fixture.orchestrator();
    let outcome = orchestrator
        .update_package(&|decision: &UpdateDecision| decision.remote_is_newer)
        .expect("update must succeed");
    assert!(matches!(outcome, PackageUpdateOutcome::Updated { .. }));
    assert_eq!(outcome.decision().latest.as_str(), "1.2");
    assert_eq!(
        orchestrator
            .installed_version()
            .expect("must read version")
            .as_str(),
        "1.2"
    );
    assert_eq!(
        fs::read_to_string(fixture.install_path().join("RebelHud/hudlayout.res"))
            .expect("must read"),
        "old layout"
    );
    assert!(!fixture.install_path().join("dl.zip").exists());
}

#[test]
fn update_package_declined_leaves_install_untouched() {
    let fixture = Fixture::new();
    fixture.seed_installed("1.0");
    fixture.fetcher.serve(VERSION_URL, "1.2");
    fixture.fetcher.serve(ARCHIVE_URL, hud_archive("1.2"));

    let outcome = fixture
        .orchestrator()
        .update_package(&|_: &UpdateDecision| false)
        .expect("check must succeed");
    assert!(matches!(outcome, PackageUpdateOutcome::Declined(_)));
    assert_eq!(
        fs::read_to_string(fixture.marker()).expect("must read marker"),
        "1.0\n"
    );
    assert_eq!(fixture.fetcher.requests(), vec![VERSION_URL.to_string()]);
}

#[test]
fn update_package_does_not_ask_when_up_to_date() {
    let fixture = Fixture::new();
    fixture.seed_installed("1.2.0");
    fixture.fetcher.serve(VERSION_URL, "1.20");

    let asked = Cell::new(false);
    let outcome = fixture
        .orchestrator()
        .update_package(&|_: &UpdateDecision| {
            asked.set(true);
            true
        })
        .expect("check must succeed");
    assert!(matches!(outcome, PackageUpdateOutcome::UpToDate(_)));
    assert!(!asked.get());
}

#[test]
fn install_while_updating_skips_installed_check() {
    let fixture = Fixture::new();
    fixture.seed_installed("1.0");
    fixture.fetcher.serve(ARCHIVE_URL, hud_archive("1.1"));

    let mut orchestrator = fixture.orchestrator();
    orchestrator
        .install_while_updating()
        .expect("reinstall must succeed");
    assert_eq!(
        orchestrator
            .installed_version()
            .expect("must read version")
            .as_str(),
        "1.1"
    );
}

#[test]
fn remove_deletes_package_directory_only() {
    let fixture = Fixture::new();
    fixture.seed_installed("1.0");
    fs::write(fixture.install_path().join("other.txt"), b"keep").expect("must write");

    let mut orchestrator = fixture.orchestrator();
    let report = orchestrator.remove().expect("remove must succeed");
    assert!(report.is_clean());
    assert!(!fixture.install_path().join("RebelHud").exists());
    assert!(fixture.install_path().join("other.txt").exists());
    assert_eq!(
        orchestrator.state().expect("must query"),
        InstallState::NotInstalled
    );

    let err = orchestrator.remove().expect_err("already removed");
    assert_eq!(err.kind(), ErrorKind::NotInstalled);
}

#[test]
fn session_keeps_first_resolved_install_path() {
    let fixture = Fixture::new();
    let mut orchestrator = fixture.orchestrator();
    let first = orchestrator
        .layout()
        .expect("must resolve")
        .install_path()
        .to_path_buf();
    assert_eq!(first, fixture.install_path());

    fs::create_dir_all(fixture.root.path().join("missing")).expect("must create earlier candidate");
    let second = orchestrator
        .layout()
        .expect("must resolve")
        .install_path()
        .to_path_buf();
    assert_eq!(second, first);
}

#[test]
fn fetch_local_version_distinguishes_missing_marker() {
    let fixture = Fixture::new();
    let config = test_config();
    let layout = InstallLayout::new(fixture.install_path(), &config.package);

    let err = fetch_local_version(&layout).expect_err("marker missing");
    assert_eq!(err.kind(), ErrorKind::NotInstalled);
    assert_eq!(install_state(&layout), InstallState::NotInstalled);

    fixture.seed_installed("2.0.1");
    let label = fetch_local_version(&layout).expect("marker present");
    assert_eq!(label.as_str(), "2.0.1");
    assert_eq!(label.number().value(), 2.01);
    assert_eq!(install_state(&layout), InstallState::Installed);
}

#[test]
fn installer_update_replaces_executable_when_confirmed() {
    let fixture = Fixture::new();
    let exe = fixture.root.path().join("hudpack");
    fs::write(&exe, b"old binary").expect("must write exe");
    fixture.fetcher.serve(INSTALLER_VERSION_URL, "999");
    fixture.fetcher.serve(INSTALLER_URL, b"new binary".to_vec());

    let outcome = fixture
        .orchestrator()
        .update_installer(&installer_endpoints(), &|_: &UpdateDecision| true, &exe)
        .expect("self-update must succeed");
    match outcome {
        InstallerUpdateOutcome::Replaced {
            decision,
            executable,
            bytes,
        } => {
            assert_eq!(decision.current.as_str(), INSTALLER_VERSION);
            assert_eq!(decision.latest.as_str(), "999");
            assert_eq!(executable, exe);
            assert_eq!(bytes, 10);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(fs::read(&exe).expect("must read exe"), b"new binary");
    assert!(!fixture.root.path().join("hudpack.download").exists());
    assert!(!fixture.root.path().join("hudpack.old").exists());
}

#[test]
fn installer_update_declined_or_current_keeps_executable() {
    let fixture = Fixture::new();
    let exe = fixture.root.path().join("hudpack");
    fs::write(&exe, b"old binary").expect("must write exe");
    fixture.fetcher.serve(INSTALLER_URL, b"new binary".to_vec());

    fixture.fetcher.serve(INSTALLER_VERSION_URL, "999");
    let outcome = fixture
        .orchestrator()
        .update_installer(&installer_endpoints(), &|_: &UpdateDecision| false, &exe)
        .expect("check must succeed");
    assert!(matches!(outcome, InstallerUpdateOutcome::Declined(_)));

    fixture.fetcher.serve(INSTALLER_VERSION_URL, "0.1");
    let outcome = fixture
        .orchestrator()
        .update_installer(&installer_endpoints(), &|_: &UpdateDecision| true, &exe)
        .expect("check must succeed");
    assert!(matches!(outcome, InstallerUpdateOutcome::UpToDate(_)));

    assert_eq!(fs::read(&exe).expect("must read exe"), b"old binary");
    assert!(!fixture
        .fetcher
        .requests()
        .contains(&INSTALLER_URL.to_string()));
}

#[test]
fn installer_update_keeps_executable_when_download_fails() {
    let fixture = Fixture::new();
    let exe = fixture.root.path().join("hudpack");
    fs::write(&exe, b"old binary").expect("must write exe");
    fixture.fetcher.serve(INSTALLER_VERSION_URL, "999");

    let err = fixture
        .orchestrator()
        .update_installer(&installer_endpoints(), &|_: &UpdateDecision| true, &exe)
        .expect_err("binary is not served");
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert_eq!(fs::read(&exe).expect("must read exe"), b"old binary");
}

#[test]
fn installer_check_does_not_need_host_directory() {
    let fixture = Fixture::new();
    fixture.fetcher.serve(INSTALLER_VERSION_URL, "0.5");
    let orchestrator = InstallOrchestrator::new(test_config(), Vec::new(), &fixture.fetcher);

    let decision = orchestrator
        .check_for_installer_update(&installer_endpoints())
        .expect("check must succeed");
    assert!(!decision.remote_is_newer);
}

/// Answers exactly one HTTP request with `status` and `body`.
fn serve_once(status: &'static str, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("must bind");
    let addr = listener.local_addr().expect("must have addr");
    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0_u8; 1024];
        while !request.windows(4).any(|window| window == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(read) => request.extend_from_slice(&buf[..read]),
            }
        }
        let header = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(header.as_bytes());
        let _ = stream.write_all(body);
    });
    format!("http://{addr}/resource")
}

fn local_http_fetcher() -> HttpFetcher {
    let client = reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .expect("must build client");
    HttpFetcher::from_client(client, &NetworkConfig::default())
}

#[test]
fn http_fetcher_streams_body_to_file() {
    let url = serve_once("200 OK", b"zip-bytes");
    let root = tempfile::tempdir().expect("must create temp dir");
    let destination = root.path().join("dl.zip");
    fs::write(&destination, b"previous content that is longer").expect("must seed file");

    let written = local_http_fetcher()
        .fetch_to_file(&url, &destination)
        .expect("download must succeed");
    assert_eq!(written, 9);
    assert_eq!(fs::read(&destination).expect("must read"), b"zip-bytes");
}

#[test]
fn http_fetcher_leaves_destination_alone_on_http_error() {
    let url = serve_once("404 Not Found", b"missing");
    let root = tempfile::tempdir().expect("must create temp dir");
    let destination = root.path().join("hudpack");
    fs::write(&destination, b"running binary").expect("must seed file");

    let err = local_http_fetcher()
        .fetch_to_file(&url, &destination)
        .expect_err("404 must fail");
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert_eq!(fs::read(&destination).expect("must read"), b"running binary");
}

#[test]
fn http_fetcher_reads_version_text() {
    let url = serve_once("200 OK", b"1.4\n");
    let label = fetch_remote_version(&local_http_fetcher(), &url).expect("must read version");
    assert_eq!(label.as_str(), "1.4");
}

#[test]
fn http_fetcher_maps_version_read_failures_to_network_errors() {
    let url = serve_once("500 Internal Server Error", b"");
    let err = local_http_fetcher()
        .read_text(&url)
        .expect_err("server error must fail");
    assert_eq!(err.kind(), ErrorKind::Network);
}
