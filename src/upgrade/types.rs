use super::fetch::FetchError;
use super::git::CommandError;
use super::version::VersionError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpgradeError {
    #[error("Unable to locate call to ExternalProject_Add({package} ...)")]
    PatternNotFound { package: String },

    #[error("Invalid ExternalProject_Add pattern for {package}: {reason}")]
    InvalidPattern { package: String, reason: String },

    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    #[error("Dependency {package} is not declared in Drake's MODULE.bazel")]
    DependencyNotDeclared { package: String },

    #[error("Dependency {package} in Drake's MODULE.bazel has no version field")]
    VersionFieldMissing { package: String },

    #[error("Unknown package {package}; expected one of: {allowed}")]
    UnknownPackage { package: String, allowed: String },

    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("{url} is not valid UTF-8")]
    ManifestEncoding { url: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Commit failed: {0}")]
    Command(#[from] CommandError),
}

/// Pinned and reference versions of one upstream package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageVersionInfo {
    pub package: String,
    /// Version pinned in the CMake build file
    pub current_version: String,
    /// Version Drake declares, canonicalized
    pub drake_version: String,
    pub needs_upgrade: bool,
}

/// What an upgrade changed in the build file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedUpgrade {
    pub package: String,
    pub version: String,
    pub old_url: String,
    pub new_url: String,
    pub old_sha256: String,
    pub new_sha256: String,
}
