//! Drake's `MODULE.bazel`, the reference for upstream dependency versions.

use super::fetch::Fetcher;
use super::version::canonicalize_reference;
use super::UpgradeError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// `bazel_dep( ... )`; dependency declarations carry no nested parentheses.
static BAZEL_DEP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bbazel_dep\s*\(([^)]*)\)").expect("bazel_dep pattern is valid"));

/// `key = "value"` keyword arguments.
static KWARG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+)\s*=\s*"([^"]*)""#).expect("keyword pattern is valid"));

/// Dependencies declared by a module file: name -> declared version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceManifest {
    deps: BTreeMap<String, Option<String>>,
}

impl ReferenceManifest {
    /// Collect every `bazel_dep(name = ..., version = ...)` declaration.
    ///
    /// Comment lines are skipped. Declarations without a `name` are ignored;
    /// the first declaration of a name wins.
    pub fn parse(text: &str) -> Self {
        let uncommented: String = text
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .map(|line| format!("{line}\n"))
            .collect();

        let mut deps = BTreeMap::new();
        for call in BAZEL_DEP_RE.captures_iter(&uncommented) {
            let mut name = None;
            let mut version = None;
            for kwarg in KWARG_RE.captures_iter(&call[1]) {
                match &kwarg[1] {
                    "name" => name = Some(kwarg[2].to_string()),
                    "version" => version = Some(kwarg[2].to_string()),
                    _ => {}
                }
            }
            if let Some(name) = name {
                deps.entry(name).or_insert(version);
            }
        }

        Self { deps }
    }

    /// Declared version of `package`, as written in the file.
    pub fn declared_version(&self, package: &str) -> Result<&str, UpgradeError> {
        match self.deps.get(package) {
            None => Err(UpgradeError::DependencyNotDeclared {
                package: package.to_string(),
            }),
            Some(None) => Err(UpgradeError::VersionFieldMissing {
                package: package.to_string(),
            }),
            Some(Some(version)) => Ok(version.as_str()),
        }
    }

    /// Declared version of `package`, canonicalized against the pinned version.
    pub fn version_for(&self, package: &str, pinned: &str) -> Result<String, UpgradeError> {
        Ok(canonicalize_reference(self.declared_version(package)?, pinned))
    }
}

/// Download and parse the reference module file.
pub async fn fetch_reference_manifest(
    fetcher: &dyn Fetcher,
    url: &str,
) -> Result<ReferenceManifest, UpgradeError> {
    let bytes = fetcher
        .fetch(url)
        .await
        .map_err(|source| UpgradeError::Download {
            url: url.to_string(),
            source,
        })?;
    let text = String::from_utf8(bytes).map_err(|_| UpgradeError::ManifestEncoding {
        url: url.to_string(),
    })?;
    Ok(ReferenceManifest::parse(&text))
}

/// Version of `package` that Drake itself uses, canonicalized against the
/// pinned version.
pub async fn fetch_reference_version(
    fetcher: &dyn Fetcher,
    url: &str,
    package: &str,
    pinned: &str,
) -> Result<String, UpgradeError> {
    fetch_reference_manifest(fetcher, url)
        .await?
        .version_for(package, pinned)
}
