//! Upgrades for the `WITH_USER_*` dependencies of drake_cmake_external.
//!
//! `drake_cmake_external/CMakeLists.txt` pins eigen, fmt and spdlog with
//! `ExternalProject_Add(<package> URL <url> URL_HASH SHA256=<sha>)`. The
//! pinned versions should follow the versions Drake itself declares in its
//! `MODULE.bazel`.
//!
//! # Usage
//!
//! ```ignore
//! let fetcher = HttpFetcher::new();
//! for info in check_packages(&fetcher, &config).await? {
//!     println!("{}: {} -> {}", info.package, info.current_version, info.drake_version);
//! }
//! ```

mod cmake;
mod fetch;
mod git;
mod manifest;
mod types;
mod version;

pub use cmake::{find_current_version, rewrite_pin, PinnedArchive};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use git::{
    commit_change, commit_commands, display_command, CommandError, CommandOutput, CommandRunner,
    ProcessRunner,
};
pub use manifest::{fetch_reference_manifest, fetch_reference_version, ReferenceManifest};
pub use types::{AppliedUpgrade, PackageVersionInfo, UpgradeError};
pub use version::{
    align_prefix, canonicalize_reference, compare_versions, extract_version, substitute_version,
    PackageVersion, VersionComparison, VersionError,
};

use crate::config::UpgradeConfig;
use crate::utils::{compute_hash, write_atomic};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Which packages to upgrade, and how
#[derive(Debug, Clone, Default)]
pub struct UpgradeRequest {
    pub packages: Vec<String>,
    /// Explicit target version; only valid for a single package
    pub version: Option<String>,
    /// Commit each rewrite instead of printing the git commands
    pub commit: bool,
}

/// Where the version to upgrade to comes from
enum TargetSource {
    Explicit(String),
    Reference(ReferenceManifest),
}

impl TargetSource {
    fn version_for(&self, package: &str, current_version: &str) -> Result<String, UpgradeError> {
        match self {
            TargetSource::Explicit(version) => Ok(align_prefix(version, current_version)),
            TargetSource::Reference(manifest) => manifest.version_for(package, current_version),
        }
    }
}

/// Reject packages outside the allow-list.
pub fn validate_package(allowed: &[String], package: &str) -> Result<(), UpgradeError> {
    if allowed.iter().any(|p| p == package) {
        Ok(())
    } else {
        Err(UpgradeError::UnknownPackage {
            package: package.to_string(),
            allowed: allowed.join(", "),
        })
    }
}

/// Path of the build file as given to git, which runs in `root`.
///
/// Relative paths are resolved against `cwd`, like the file reads are. A
/// build file outside `root` is passed as an absolute path.
pub fn commit_path(build_file: &Path, root: &Path, cwd: &Path) -> PathBuf {
    let build_file = cwd.join(build_file);
    let root = cwd.join(root);
    match build_file.strip_prefix(&root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => build_file,
    }
}

async fn read_build_file(path: &Path) -> Result<String, UpgradeError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| UpgradeError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Compare the pinned version of `package` with the reference version.
pub fn decide_upgrade(
    package: &str,
    build_text: &str,
    manifest: &ReferenceManifest,
) -> Result<PackageVersionInfo, UpgradeError> {
    let pin = find_current_version(package, build_text)?;
    let current_version = extract_version(&pin.url)?;
    let drake_version = manifest.version_for(package, &current_version)?;

    if let (Ok(pinned), Ok(reference)) = (
        PackageVersion::parse(&current_version),
        PackageVersion::parse(&drake_version),
    ) {
        if compare_versions(&pinned, &reference) == VersionComparison::PinnedAhead {
            warn!(
                package = %package,
                pinned = %pinned,
                drake = %reference,
                "Pinned version is newer than Drake's"
            );
        }
    }

    Ok(PackageVersionInfo {
        package: package.to_string(),
        needs_upgrade: current_version != drake_version,
        current_version,
        drake_version,
    })
}

/// Rewrite the pin of `package` in `build_file` to `new_version`.
///
/// The new archive is downloaded and hashed in full before the file is
/// touched; a failed download leaves the build file unchanged.
pub async fn apply_upgrade(
    fetcher: &dyn Fetcher,
    package: &str,
    new_version: &str,
    build_file: &Path,
) -> Result<AppliedUpgrade, UpgradeError> {
    let text = read_build_file(build_file).await?;
    let old = find_current_version(package, &text)?;
    let current_version = extract_version(&old.url)?;
    let version = align_prefix(new_version, &current_version);
    let new_url = substitute_version(&old.url, &version)?;

    info!(package = %package, url = %old.url, sha256 = %old.sha256, "Old pin");
    info!(package = %package, url = %new_url, "Downloading new archive");

    let archive = fetcher
        .fetch(&new_url)
        .await
        .map_err(|source| UpgradeError::Download {
            url: new_url.clone(),
            source,
        })?;

    let new = PinnedArchive {
        url: new_url,
        sha256: compute_hash(&archive),
    };
    info!(package = %package, url = %new.url, sha256 = %new.sha256, "New pin");

    let rewritten = rewrite_pin(&text, &old, &new);
    write_atomic(build_file, &rewritten)
        .await
        .map_err(|source| UpgradeError::Io {
            path: build_file.display().to_string(),
            source,
        })?;

    Ok(AppliedUpgrade {
        package: package.to_string(),
        version,
        old_url: old.url,
        new_url: new.url,
        old_sha256: old.sha256,
        new_sha256: new.sha256,
    })
}

/// Compare every allowed package against the reference manifest.
pub async fn check_packages(
    fetcher: &dyn Fetcher,
    config: &UpgradeConfig,
) -> Result<Vec<PackageVersionInfo>, UpgradeError> {
    let build_text = read_build_file(&config.build_file).await?;
    let manifest = fetch_reference_manifest(fetcher, &config.manifest_url).await?;

    config
        .packages
        .iter()
        .map(|package| decide_upgrade(package, &build_text, &manifest))
        .collect()
}

/// Upgrade the requested packages in order, stopping at the first error.
///
/// Packages already at the target version are skipped. After each rewrite
/// the change is committed or the commit commands are printed.
pub async fn upgrade_packages(
    fetcher: &dyn Fetcher,
    runner: &dyn CommandRunner,
    config: &UpgradeConfig,
    request: &UpgradeRequest,
) -> Result<Vec<AppliedUpgrade>, UpgradeError> {
    for package in &request.packages {
        validate_package(&config.packages, package)?;
    }

    let target_source = match &request.version {
        Some(version) => TargetSource::Explicit(version.clone()),
        None => {
            TargetSource::Reference(fetch_reference_manifest(fetcher, &config.manifest_url).await?)
        }
    };

    let cwd = std::env::current_dir().map_err(|source| UpgradeError::Io {
        path: ".".to_string(),
        source,
    })?;
    let git_file = commit_path(&config.build_file, &config.root, &cwd);

    let mut applied = Vec::new();
    for package in &request.packages {
        let build_text = read_build_file(&config.build_file).await?;
        let pin = find_current_version(package, &build_text)?;
        let current_version = extract_version(&pin.url)?;

        let target = target_source.version_for(package, &current_version)?;

        if target == current_version {
            info!(package = %package, version = %current_version, "Already up to date");
            continue;
        }

        let upgrade = apply_upgrade(fetcher, package, &target, &config.build_file).await?;
        info!(
            package = %package,
            from = %current_version,
            to = %upgrade.version,
            "Upgraded"
        );

        commit_change(
            runner,
            &config.root,
            package,
            &upgrade.version,
            &git_file,
            request.commit,
        )
        .await?;

        applied.push(upgrade);
    }

    Ok(applied)
}
