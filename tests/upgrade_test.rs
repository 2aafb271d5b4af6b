mod common;

use common::{create_test_dir, write_file, FakeFetcher, FakeRunner};
use drake_examples_tools::config::UpgradeConfig;
use drake_examples_tools::upgrade::{
    apply_upgrade, check_packages, fetch_reference_version, upgrade_packages, PackageVersionInfo,
    UpgradeError, UpgradeRequest,
};
use drake_examples_tools::utils::compute_hash;
use std::path::Path;
use tokio::fs;

const MODULE_URL: &str = "https://drake.example/MODULE.bazel";
const BUILD_FILE: &str = "drake_cmake_external/CMakeLists.txt";

const EIGEN_SHA: &str = "8586084f71f9bde545ee7fa6d00288b264a2b7ac3607b974e54d13e7162c1c72";
const FMT_SHA: &str = "6cb1e6d37bdcb756dbbe59be438790db409cdb4868c66e888d5df9f13f7c027f";
const SPDLOG_SHA: &str = "1586508029a7d0670dfcb2d97575dcdc242d3868a259742b69f100801ab4e16b";

const EIGEN_341_URL: &str = "https://gitlab.com/libeigen/eigen/-/archive/3.4.1/eigen-3.4.1.tar.gz";
const SPDLOG_1150_URL: &str = "https://github.com/gabime/spdlog/archive/refs/tags/v1.15.0.tar.gz";

fn cmake_lists() -> String {
    format!(
        r#"cmake_minimum_required(VERSION 3.22...4.1)
project(drake_cmake_external)

include(ExternalProject)

if(WITH_USER_EIGEN)
  ExternalProject_Add(eigen
    URL https://gitlab.com/libeigen/eigen/-/archive/3.4.0/eigen-3.4.0.tar.gz
    URL_HASH SHA256={EIGEN_SHA}
    CMAKE_ARGS -DCMAKE_INSTALL_PREFIX=${{CMAKE_INSTALL_PREFIX}}
  )
endif()

if(WITH_USER_FMT)
  ExternalProject_Add(fmt
    URL https://github.com/fmtlib/fmt/archive/refs/tags/11.0.2.tar.gz
    URL_HASH SHA256={FMT_SHA}
    CMAKE_ARGS -DFMT_TEST=OFF
  )
endif()

if(WITH_USER_SPDLOG)
  ExternalProject_Add(spdlog
    URL https://github.com/gabime/spdlog/archive/refs/tags/v1.14.1.tar.gz
    URL_HASH SHA256={SPDLOG_SHA}
    CMAKE_ARGS -DSPDLOG_FMT_EXTERNAL=ON
  )
endif()
"#
    )
}

const MODULE_BAZEL: &str = r#"module(name = "drake")

bazel_dep(name = "eigen", version = "3.4.1")
bazel_dep(name = "fmt", version = "11.0.2.bcr.1")
# bazel_dep(name = "spdlog", version = "0.0.1")
bazel_dep(name = "spdlog", version = "1.15.0")
"#;

async fn setup_project(root: &Path) -> UpgradeConfig {
    write_file(root, BUILD_FILE, cmake_lists()).await;
    let mut config = UpgradeConfig::for_root(root);
    config.manifest_url = MODULE_URL.to_string();
    config
}

async fn read_build_file(config: &UpgradeConfig) -> String {
    fs::read_to_string(&config.build_file)
        .await
        .expect("Should read build file")
}

fn request(packages: &[&str], commit: bool) -> UpgradeRequest {
    UpgradeRequest {
        packages: packages.iter().map(|p| p.to_string()).collect(),
        version: None,
        commit,
    }
}

#[tokio::test]
async fn test_check_packages_reports_every_package() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let fetcher = FakeFetcher::default().with(MODULE_URL, MODULE_BAZEL);

    let report = check_packages(&fetcher, &config).await.expect("Should check");

    assert_eq!(
        report,
        vec![
            PackageVersionInfo {
                package: "eigen".to_string(),
                current_version: "3.4.0".to_string(),
                drake_version: "3.4.1".to_string(),
                needs_upgrade: true,
            },
            PackageVersionInfo {
                package: "fmt".to_string(),
                current_version: "11.0.2".to_string(),
                drake_version: "11.0.2".to_string(),
                needs_upgrade: false,
            },
            PackageVersionInfo {
                package: "spdlog".to_string(),
                current_version: "v1.14.1".to_string(),
                drake_version: "v1.15.0".to_string(),
                needs_upgrade: true,
            },
        ]
    );
    assert_eq!(fetcher.requested(), vec![MODULE_URL.to_string()]);
}

#[tokio::test]
async fn test_check_packages_serializes_to_json() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let fetcher = FakeFetcher::default().with(MODULE_URL, MODULE_BAZEL);

    let report = check_packages(&fetcher, &config).await.expect("Should check");
    let json = serde_json::to_value(&report).expect("Should serialize");

    assert_eq!(json[0]["package"], "eigen");
    assert_eq!(json[0]["needs_upgrade"], true);
    assert_eq!(json[1]["drake_version"], "11.0.2");
}

#[tokio::test]
async fn test_check_packages_manifest_unreachable() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;

    let result = check_packages(&FakeFetcher::default(), &config).await;
    assert!(matches!(result, Err(UpgradeError::Download { .. })));
}

#[tokio::test]
async fn test_apply_upgrade_rewrites_url_and_hash() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let payload = b"eigen 3.4.1 archive".to_vec();
    let fetcher = FakeFetcher::default().with(EIGEN_341_URL, payload.clone());

    let applied = apply_upgrade(&fetcher, "eigen", "3.4.1", &config.build_file)
        .await
        .expect("Should upgrade");

    assert_eq!(applied.new_url, EIGEN_341_URL);
    assert_eq!(applied.old_sha256, EIGEN_SHA);
    assert_eq!(applied.new_sha256, compute_hash(&payload));

    let text = read_build_file(&config).await;
    assert!(text.contains(EIGEN_341_URL));
    assert!(text.contains(&format!("SHA256={}", applied.new_sha256)));
    assert!(!text.contains("3.4.0"));
    assert!(!text.contains(EIGEN_SHA));
    // Other pins are untouched.
    assert!(text.contains(FMT_SHA));
    assert!(text.contains("v1.14.1"));
}

#[tokio::test]
async fn test_apply_upgrade_download_failure_leaves_file_unchanged() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let before = read_build_file(&config).await;

    let result = apply_upgrade(&FakeFetcher::default(), "eigen", "3.4.1", &config.build_file).await;

    assert!(matches!(
        result,
        Err(UpgradeError::Download { ref url, .. }) if url == EIGEN_341_URL
    ));
    assert_eq!(read_build_file(&config).await, before);
}

#[tokio::test]
async fn test_apply_upgrade_missing_pin() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;

    let result = apply_upgrade(&FakeFetcher::default(), "boost", "1.86.0", &config.build_file).await;
    assert!(matches!(
        result,
        Err(UpgradeError::PatternNotFound { ref package }) if package == "boost"
    ));
}

#[tokio::test]
async fn test_upgrade_commits_in_project_root() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let fetcher = FakeFetcher::default()
        .with(MODULE_URL, MODULE_BAZEL)
        .with(EIGEN_341_URL, "eigen");
    let runner = FakeRunner::default();

    let applied = upgrade_packages(&fetcher, &runner, &config, &request(&["eigen"], true))
        .await
        .expect("Should upgrade");

    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].version, "3.4.1");

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, vec!["git", "add", BUILD_FILE]);
    assert_eq!(
        calls[1].0,
        vec![
            "git",
            "commit",
            "-m",
            "[drake_cmake_external] Upgrade eigen to 3.4.1",
            BUILD_FILE,
        ]
    );
    assert!(calls.iter().all(|(_, cwd)| cwd == temp_dir.path()));
}

#[tokio::test]
async fn test_upgrade_without_commit_runs_nothing() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let fetcher = FakeFetcher::default()
        .with(MODULE_URL, MODULE_BAZEL)
        .with(EIGEN_341_URL, "eigen");
    let runner = FakeRunner::default();

    upgrade_packages(&fetcher, &runner, &config, &request(&["eigen"], false))
        .await
        .expect("Should upgrade");

    assert!(runner.calls().is_empty());
    assert!(read_build_file(&config).await.contains(EIGEN_341_URL));
}

#[tokio::test]
async fn test_upgrade_rejects_unknown_package_before_fetching() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let fetcher = FakeFetcher::default().with(MODULE_URL, MODULE_BAZEL);
    let runner = FakeRunner::default();

    let result = upgrade_packages(&fetcher, &runner, &config, &request(&["eigen", "boost"], true)).await;

    assert!(matches!(
        result,
        Err(UpgradeError::UnknownPackage { ref package, .. }) if package == "boost"
    ));
    assert!(fetcher.requested().is_empty());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_upgrade_skips_package_already_current() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let before = read_build_file(&config).await;
    let fetcher = FakeFetcher::default().with(MODULE_URL, MODULE_BAZEL);
    let runner = FakeRunner::default();

    let applied = upgrade_packages(&fetcher, &runner, &config, &request(&["fmt"], true))
        .await
        .expect("Should succeed");

    assert!(applied.is_empty());
    assert_eq!(fetcher.requested(), vec![MODULE_URL.to_string()]);
    assert!(runner.calls().is_empty());
    assert_eq!(read_build_file(&config).await, before);
}

#[tokio::test]
async fn test_upgrade_commit_failure_propagates() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let fetcher = FakeFetcher::default()
        .with(MODULE_URL, MODULE_BAZEL)
        .with(EIGEN_341_URL, "eigen");
    let runner = FakeRunner {
        fail_on: Some("add".to_string()),
        ..Default::default()
    };

    let result = upgrade_packages(&fetcher, &runner, &config, &request(&["eigen"], true)).await;

    match result {
        Err(UpgradeError::Command(e)) => {
            let message = e.to_string();
            assert!(message.contains("git add"), "{message}");
            assert!(message.contains("not a git repository"), "{message}");
        }
        other => panic!("expected commit failure, got {other:?}"),
    }
    // The commit is not attempted once staging fails.
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn test_upgrade_explicit_version_keeps_v_prefix() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let fetcher = FakeFetcher::default().with(SPDLOG_1150_URL, "spdlog");
    let runner = FakeRunner::default();

    let request = UpgradeRequest {
        packages: vec!["spdlog".to_string()],
        version: Some("1.15.0".to_string()),
        commit: true,
    };
    let applied = upgrade_packages(&fetcher, &runner, &config, &request)
        .await
        .expect("Should upgrade");

    assert_eq!(applied[0].version, "v1.15.0");
    assert_eq!(applied[0].new_url, SPDLOG_1150_URL);
    // No reference manifest is needed for an explicit version.
    assert_eq!(fetcher.requested(), vec![SPDLOG_1150_URL.to_string()]);
    assert_eq!(
        runner.calls()[1].0[3],
        "[drake_cmake_external] Upgrade spdlog to v1.15.0"
    );
}

#[tokio::test]
async fn test_upgrade_several_packages_in_order() {
    let temp_dir = create_test_dir();
    let config = setup_project(temp_dir.path()).await;
    let fetcher = FakeFetcher::default()
        .with(MODULE_URL, MODULE_BAZEL)
        .with(EIGEN_341_URL, "eigen")
        .with(SPDLOG_1150_URL, "spdlog");
    let runner = FakeRunner::default();

    let applied = upgrade_packages(
        &fetcher,
        &runner,
        &config,
        &request(&["spdlog", "fmt", "eigen"], false),
    )
    .await
    .expect("Should upgrade");

    let upgraded: Vec<_> = applied.iter().map(|a| a.package.as_str()).collect();
    assert_eq!(upgraded, vec!["spdlog", "eigen"]);

    let text = read_build_file(&config).await;
    assert!(text.contains(EIGEN_341_URL));
    assert!(text.contains(SPDLOG_1150_URL));
    assert!(text.contains(&compute_hash(b"eigen")));
    assert!(text.contains(&compute_hash(b"spdlog")));

    // A second run finds nothing left to do.
    let again = upgrade_packages(
        &fetcher,
        &runner,
        &config,
        &request(&["spdlog", "fmt", "eigen"], false),
    )
    .await
    .expect("Should succeed");
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_fetch_reference_version_canonicalizes() {
    let fetcher = FakeFetcher::default().with(MODULE_URL, MODULE_BAZEL);

    let fmt = fetch_reference_version(&fetcher, MODULE_URL, "fmt", "11.0.2")
        .await
        .expect("Should fetch fmt");
    assert_eq!(fmt, "11.0.2");

    let spdlog = fetch_reference_version(&fetcher, MODULE_URL, "spdlog", "v1.14.1")
        .await
        .expect("Should fetch spdlog");
    assert_eq!(spdlog, "v1.15.0");

    let undeclared = fetch_reference_version(&fetcher, MODULE_URL, "boost", "1.86.0").await;
    assert!(matches!(
        undeclared,
        Err(UpgradeError::DependencyNotDeclared { ref package }) if package == "boost"
    ));
}

#[tokio::test]
async fn test_fetch_reference_version_download_failure() {
    let result =
        fetch_reference_version(&FakeFetcher::default(), MODULE_URL, "eigen", "3.4.0").await;
    assert!(matches!(
        result,
        Err(UpgradeError::Download { ref url, .. }) if url == MODULE_URL
    ));
}

#[tokio::test]
async fn test_apply_upgrade_keeps_each_version_prefix() {
    let temp_dir = create_test_dir();
    let old_url = "https://github.com/gabime/spdlog/releases/download/v1.14.1/spdlog-1.14.1.tar.gz";
    let new_url = "https://github.com/gabime/spdlog/releases/download/v1.15.0/spdlog-1.15.0.tar.gz";
    let text = format!(
        "ExternalProject_Add(spdlog\n  URL {old_url}\n  URL_HASH SHA256={SPDLOG_SHA}\n)\n"
    );
    write_file(temp_dir.path(), BUILD_FILE, text).await;
    let build_file = temp_dir.path().join(BUILD_FILE);
    let fetcher = FakeFetcher::default().with(new_url, "spdlog");

    let applied = apply_upgrade(&fetcher, "spdlog", "1.15.0", &build_file)
        .await
        .expect("Should upgrade");

    assert_eq!(applied.version, "v1.15.0");
    assert_eq!(applied.new_url, new_url);
    assert_eq!(fetcher.requested(), vec![new_url.to_string()]);
}
