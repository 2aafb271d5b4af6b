//! Version strings as they appear in archive URLs and in Drake's module file.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// `v?MAJOR.MINOR(.PATCH)...`
static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"v?\d+\.\d+(?:\.\d+)*").expect("version pattern is valid"));

/// The numeric part of a version, leaving any `v` in place.
static NUMERIC_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\d+(?:\.\d+)*").expect("numeric version pattern is valid"));

/// Registry-specific suffix appended by the Bazel Central Registry.
const BCR_MARKER: &str = ".bcr";

/// Error types for version operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),

    #[error("No version number found in {0}")]
    NotFound(String),
}

/// A dotted numeric version with an optional leading `v`.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    pub prefixed: bool,
    pub components: Vec<u64>,
}

impl PackageVersion {
    /// Parse a version string (e.g., "3.4.0" or "v1.14.1").
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let (prefixed, digits) = match s.strip_prefix('v') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let components = digits
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionError::InvalidFormat(s.to_string()))?;

        if components.len() < 2 {
            return Err(VersionError::InvalidFormat(s.to_string()));
        }

        Ok(Self {
            prefixed,
            components,
        })
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefixed {
            write!(f, "v")?;
        }
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Orders by numeric components; missing trailing components count as zero
/// and the `v` prefix is ignored.
impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| {
                let a = self.components.get(i).copied().unwrap_or(0);
                let b = other.components.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of comparing the pinned version against the reference version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComparison {
    /// Pinned version equals the reference.
    Equal,
    /// Pinned version is older than the reference (can upgrade).
    PinnedBehind,
    /// Pinned version is newer than the reference.
    PinnedAhead,
}

/// Compare the pinned version against the reference version.
pub fn compare_versions(pinned: &PackageVersion, reference: &PackageVersion) -> VersionComparison {
    match pinned.cmp(reference) {
        Ordering::Equal => VersionComparison::Equal,
        Ordering::Less => VersionComparison::PinnedBehind,
        Ordering::Greater => VersionComparison::PinnedAhead,
    }
}

/// Extract the first version number appearing in `url`.
pub fn extract_version(url: &str) -> Result<String, VersionError> {
    VERSION_RE
        .find(url)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| VersionError::NotFound(url.to_string()))
}

/// Replace every version number in `url` with `version`.
///
/// Only the numeric part is rewritten, so each occurrence keeps its own `v`
/// prefix (or lack of one) and a leading `v` on `version` is ignored.
pub fn substitute_version(url: &str, version: &str) -> Result<String, VersionError> {
    if !NUMERIC_VERSION_RE.is_match(url) {
        return Err(VersionError::NotFound(url.to_string()));
    }
    let numeric = version.strip_prefix('v').unwrap_or(version);
    Ok(NUMERIC_VERSION_RE
        .replace_all(url, regex::NoExpand(numeric))
        .into_owned())
}

/// Give `version` a leading `v` when the pinned version uses one.
pub fn align_prefix(version: &str, pinned: &str) -> String {
    if pinned.starts_with('v') && !version.starts_with('v') {
        format!("v{version}")
    } else {
        version.to_string()
    }
}

/// Canonicalize a reference version for comparison with a pinned version:
/// drop any `.bcr` registry suffix and align the `v` prefix.
pub fn canonicalize_reference(reference: &str, pinned: &str) -> String {
    let base = match reference.find(BCR_MARKER) {
        Some(index) => &reference[..index],
        None => reference,
    };
    align_prefix(base, pinned)
}
