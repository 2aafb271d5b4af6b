use super::UpgradeError;
use regex::Regex;

/// Download location and checksum pinned by an `ExternalProject_Add` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedArchive {
    pub url: String,
    pub sha256: String,
}

/// Pattern matching
/// `ExternalProject_Add(<package> ... URL <url> URL_HASH SHA256=<sha> ...)`,
/// capturing the URL and the checksum.
fn external_project_pattern(package: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        concat!(
            r"ExternalProject_Add\s*\(\s*",
            r"{}\b[\s\S]*?",
            r"\bURL\s+(\S*)\s+",
            r"\bURL_HASH\s+SHA256=([0-9A-Fa-f]{{64}})",
            r"[^\)]*\)",
        ),
        regex::escape(package)
    ))
}

/// Locate the URL and checksum pinned for `package` in a CMake file.
pub fn find_current_version(package: &str, build_text: &str) -> Result<PinnedArchive, UpgradeError> {
    let pattern = external_project_pattern(package).map_err(|e| UpgradeError::InvalidPattern {
        package: package.to_string(),
        reason: e.to_string(),
    })?;

    let captures = pattern
        .captures(build_text)
        .ok_or_else(|| UpgradeError::PatternNotFound {
            package: package.to_string(),
        })?;

    Ok(PinnedArchive {
        url: captures[1].to_string(),
        sha256: captures[2].to_string(),
    })
}

/// Replace every literal occurrence of the old URL and checksum.
pub fn rewrite_pin(build_text: &str, old: &PinnedArchive, new: &PinnedArchive) -> String {
    build_text
        .replace(&old.url, &new.url)
        .replace(&old.sha256, &new.sha256)
}
