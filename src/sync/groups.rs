use super::types::{FileGroup, Mismatch};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// English ordinal for a 1-based position ("1st", "12th", "23rd").
pub fn ordinalize(number: usize) -> String {
    if (number % 100) / 10 == 1 {
        return format!("{number}th");
    }
    let suffix = match number % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{number}{suffix}")
}

/// Check that every file of a group exists and has identical content.
///
/// `index` is the 0-based position of the group in its table; paths are
/// resolved against `root`. Unreadable files are reported and left out of the
/// comparison, and any content difference yields a single mismatch for the
/// whole group.
pub async fn check_group(index: usize, group: &FileGroup, root: &Path) -> Vec<Mismatch> {
    let prologue = format!(
        "The {} list of files (containing {})",
        ordinalize(index + 1),
        group.first_name()
    );
    let mut mismatches = Vec::new();

    if !group.is_sorted() {
        mismatches.push(Mismatch::NotSorted {
            prologue: prologue.clone(),
        });
    }

    let mut contents = Vec::with_capacity(group.paths().len());
    for path in group.paths() {
        match fs::read(root.join(path)).await {
            Ok(bytes) => contents.push(bytes),
            Err(e) => {
                debug!(path = %path, error = %e, "Failed to read file");
                mismatches.push(Mismatch::MissingFile {
                    prologue: prologue.clone(),
                    path: path.clone(),
                });
            }
        }
    }

    let all_match = contents.windows(2).all(|pair| pair[0] == pair[1]);
    if !all_match {
        mismatches.push(Mismatch::FilesDiffer { prologue });
    }

    mismatches
}
