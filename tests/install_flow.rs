mod common;

use common::{FakeFetcher, FetchMode, OLD_MTIME, Sandbox, catalog_for, linux};
use lilyponddist::libs::installer::FailureCause;
use lilyponddist::{
    Catalog, DownloadPolicy, Error, InstallRequest, InstallState, InstallerOptions, PlatformKey,
    RootPolicy, Version,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

const V2241: Version = Version::new(2, 24, 1);
const V2243: Version = Version::new(2, 24, 3);

fn two_versions() -> Catalog {
    catalog_for(&linux(), &[V2241, V2243], ".tar.gz")
}

fn installed(dist_root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dist_root)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn resolving_on_an_empty_root_installs_the_latest_version() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);
    assert!(!dist.is_installed(None));

    let executable = dist.resolve_executable(None).unwrap();

    assert!(executable.ends_with(Path::new("bin").join("lilypond")));
    assert_eq!(executable, sandbox.root().join("lilypond-2.24.3/bin/lilypond"));
    assert!(dist.is_installed(None));
    assert!(dist.is_installed(Some(V2243)));
    assert!(!dist.is_installed(Some(V2241)));
    assert_eq!(dist.installer().state(), InstallState::Installed);
    assert_eq!(
        dist.installer().fetcher().calls(),
        vec!["https://example.invalid/dist/lilypond-2.24.3-linux-x86_64.tar.gz".to_string()]
    );
}

#[test]
fn skip_policy_fetches_each_archive_at_most_once() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);

    dist.install(&InstallRequest::for_version(V2243)).unwrap();
    dist.install(&InstallRequest::for_version(V2243)).unwrap();
    dist.resolve_executable(Some(V2243)).unwrap();

    assert_eq!(dist.installer().fetcher().calls().len(), 1);
    assert!(dist.is_installed(Some(V2243)));
}

#[test]
fn overwrite_policy_fetches_again() {
    let sandbox = Sandbox::new();
    let options = InstallerOptions {
        download_policy: DownloadPolicy::Overwrite,
        ..sandbox.options()
    };
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), options, true);

    dist.install(&InstallRequest::for_version(V2241)).unwrap();
    dist.install(&InstallRequest::for_version(V2241)).unwrap();
    assert_eq!(dist.installer().fetcher().calls().len(), 2);
}

#[test]
fn update_check_follows_the_greatest_installed_version() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);
    assert_eq!(dist.check_for_update(), Some(V2243));

    dist.install(&InstallRequest::for_version(V2241)).unwrap();
    assert_eq!(dist.check_for_update(), Some(V2243));

    assert_eq!(dist.update().unwrap(), Some(V2243));
    assert_eq!(dist.check_for_update(), None);
    assert_eq!(dist.update().unwrap(), None);
}

#[test]
fn merge_keeps_other_versions_and_wipe_removes_them() {
    let sandbox = Sandbox::new();
    let mut merging = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);
    merging.install(&InstallRequest::for_version(V2241)).unwrap();
    merging.install(&InstallRequest::for_version(V2243)).unwrap();
    assert_eq!(installed(&sandbox.root()), vec!["lilypond-2.24.1", "lilypond-2.24.3"]);

    let options = InstallerOptions {
        root_policy: RootPolicy::Wipe,
        ..sandbox.options()
    };
    let mut wiping = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), options, true);
    wiping.install(&InstallRequest::for_version(V2241)).unwrap();
    assert_eq!(installed(&sandbox.root()), vec!["lilypond-2.24.1"]);
}

#[test]
fn failed_download_is_retryable_and_installs_nothing() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Fail), sandbox.options(), true);

    let err = dist.resolve_executable(None).unwrap_err();
    assert!(matches!(err, Error::Download { .. }));
    assert!(err.is_retryable());
    assert_eq!(dist.installer().state(), InstallState::Failed(FailureCause::Download));
    assert!(!dist.is_installed(None));
}

#[test]
fn payload_missing_after_fetch_is_a_download_error() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::WriteNothing), sandbox.options(), true);

    let err = dist.install(&InstallRequest::default()).unwrap_err();
    assert!(matches!(err, Error::Download { .. }));
}

#[test]
fn unknown_archive_suffix_is_unsupported_format() {
    let sandbox = Sandbox::new();
    let catalog = catalog_for(&linux(), &[V2243], ".tar.xz");
    let mut dist = sandbox.dist(catalog, linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);

    let err = dist.install(&InstallRequest::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
    assert!(!err.is_retryable());
    assert_eq!(
        dist.installer().state(),
        InstallState::Failed(FailureCause::UnsupportedFormat)
    );
}

#[test]
fn unknown_version_and_unsupported_platform_stay_distinct() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);

    match dist.install(&InstallRequest::for_version((2, 23, 0))) {
        Err(Error::UnknownVersion { available, .. }) => assert_eq!(available, vec![V2241, V2243]),
        other => panic!("expected UnknownVersion, got {other:?}"),
    }

    let windows = InstallRequest::for_version(V2243).on_platform(Some("win64".into()), None);
    match dist.install(&windows) {
        Err(Error::UnsupportedPlatform { platform, supported, .. }) => {
            assert_eq!(platform, PlatformKey::new("windows", "x86_64"));
            assert_eq!(supported, vec![linux()]);
        }
        other => panic!("expected UnsupportedPlatform, got {other:?}"),
    }
    assert!(dist.installer().fetcher().calls().is_empty());
}

#[test]
fn disabled_auto_install_reports_not_installed() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), false);

    assert!(matches!(
        dist.resolve_executable(Some(V2241)),
        Err(Error::NotInstalled { version: Some(v) }) if v == V2241
    ));
    assert!(dist.installer().fetcher().calls().is_empty());
}

#[test]
fn partial_install_is_reported_as_missing_executable() {
    let sandbox = Sandbox::new();
    fs::create_dir_all(sandbox.root().join("lilypond-2.24.3/bin")).unwrap();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);

    match dist.resolve_executable(Some(V2243)) {
        Err(Error::ExecutableMissing { path }) => {
            assert_eq!(path, sandbox.root().join("lilypond-2.24.3/bin/lilypond"))
        }
        other => panic!("expected ExecutableMissing, got {other:?}"),
    }
    assert!(!dist.is_installed(Some(V2243)));

    // Reinstalling repairs it.
    dist.install(&InstallRequest::for_version(V2243)).unwrap();
    assert!(dist.resolve_executable(Some(V2243)).is_ok());
}

#[test]
fn bytecode_caches_are_touched_after_expansion() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);
    dist.install(&InstallRequest::for_version(V2243)).unwrap();

    let old = SystemTime::UNIX_EPOCH + Duration::from_secs(OLD_MTIME);
    let entry = sandbox.root().join("lilypond-2.24.3");
    let mtime = |rel: &str| fs::metadata(entry.join(rel)).unwrap().modified().unwrap();

    assert!(mtime("lib/guile/2.2/ccache/ice-9/boot-9.go") > old);
    assert!(mtime("lib/lilypond/2.24.3/ccache/lily/lily.go") > old);
    assert_eq!(mtime("share/lilypond/2.24.3/ly/init.ly"), old);
}

#[test]
fn windows_zip_installs_lilypond_exe() {
    let sandbox = Sandbox::new();
    let windows = PlatformKey::new("windows", "amd64");
    let catalog = catalog_for(&windows, &[V2243], ".zip");
    let mut dist = sandbox.dist(catalog, windows, FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);

    let executable = dist.resolve_executable(None).unwrap();
    assert_eq!(executable, sandbox.root().join("lilypond-2.24.3/bin/lilypond.exe"));
}

#[test]
fn os_override_resolves_the_foreign_executable() {
    let sandbox = Sandbox::new();
    let windows = PlatformKey::new("windows", "x86_64");
    let catalog = catalog_for(&windows, &[V2243], ".zip");
    let defaults = InstallRequest::default().on_platform(Some("windows".into()), None);
    let mut dist = sandbox.dist_with_defaults(
        catalog,
        linux(),
        FakeFetcher::new(FetchMode::Archive),
        sandbox.options(),
        true,
        defaults,
    );

    let executable = dist.resolve_executable(None).unwrap();
    assert_eq!(executable, sandbox.root().join("lilypond-2.24.3/bin/lilypond.exe"));
    assert_eq!(dist.installer().state(), InstallState::Installed);
}

#[test]
fn uninstall_removes_a_single_version() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), false);
    dist.install(&InstallRequest::for_version(V2241)).unwrap();
    dist.install(&InstallRequest::for_version(V2243)).unwrap();

    dist.uninstall(V2243).unwrap();
    assert!(!dist.is_installed(Some(V2243)));
    assert_eq!(dist.resolve_executable(None).unwrap(), sandbox.root().join("lilypond-2.24.1/bin/lilypond"));
}

#[cfg(unix)]
#[test]
fn installed_binary_reports_its_version() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);
    dist.install(&InstallRequest::for_version(V2241)).unwrap();

    let (version, line) = dist.installed_version().unwrap();
    assert_eq!(version, V2241);
    assert_eq!(line, "GNU LilyPond 2.24.1 (running Guile 2.2)");
    assert!(dist.needs_update().unwrap());

    dist.update().unwrap();
    assert_eq!(dist.installed_version().unwrap().0, V2243);
    assert!(!dist.needs_update().unwrap());
}

#[test]
fn initialize_installs_on_a_fresh_root_only() {
    let sandbox = Sandbox::new();
    let mut dist = sandbox.dist(two_versions(), linux(), FakeFetcher::new(FetchMode::Archive), sandbox.options(), true);

    assert_eq!(dist.initialize().unwrap(), Some(sandbox.root()));
    assert_eq!(dist.initialize().unwrap(), None);
    assert_eq!(dist.installer().fetcher().calls().len(), 1);
}
