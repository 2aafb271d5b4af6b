//! Types shared by the file-group and workflow checks.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// An ordered list of files that must be byte-identical
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    paths: Vec<String>,
}

impl FileGroup {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Whether the declared order equals the lexicographic order
    pub fn is_sorted(&self) -> bool {
        self.paths.windows(2).all(|pair| pair[0] <= pair[1])
    }

    /// File name of the first entry, used to identify the group in messages
    pub fn first_name(&self) -> String {
        self.paths
            .first()
            .and_then(|p| Path::new(p).file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// The three files compared for one workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTriple {
    pub name: String,
    /// Root CI template, `.github/workflows/ci.yml`
    pub root: PathBuf,
    /// Standalone workflow, `.github/workflows/<name>.yml`
    pub variant: PathBuf,
    /// Composed CI file inside the example, `drake_<name>/.github/workflows/ci.yml`
    pub subdir: PathBuf,
}

impl WorkflowTriple {
    pub fn for_workflow(name: &str) -> Self {
        Self {
            name: name.to_string(),
            root: PathBuf::from(".github/workflows/ci.yml"),
            variant: PathBuf::from(format!(".github/workflows/{name}.yml")),
            subdir: PathBuf::from(format!("drake_{name}/.github/workflows/ci.yml")),
        }
    }

    /// Resolve the three paths against a project root
    pub fn under(&self, root: &Path) -> Self {
        Self {
            name: self.name.clone(),
            root: root.join(&self.root),
            variant: root.join(&self.variant),
            subdir: root.join(&self.subdir),
        }
    }
}

/// Workflow name -> recognised `workflow_dispatch` option names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOptionsTable {
    entries: Vec<(String, Vec<String>)>,
}

impl WorkflowOptionsTable {
    pub fn from_entries(entries: &[(&str, &[&str])]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, options)| {
                    (
                        name.to_string(),
                        options.iter().map(|o| o.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Options recognised for one workflow; empty for unknown workflows
    pub fn options_for(&self, workflow: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(name, _)| name == workflow)
            .map(|(_, options)| options.as_slice())
            .unwrap_or(&[])
    }

    /// Union of every workflow's options
    pub fn all_options(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .flat_map(|(_, options)| options.iter().cloned())
            .collect()
    }
}

/// A structural inconsistency. Recorded and reported, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    #[error("{prologue} is not alpha-sorted; fix the file sync table.")]
    NotSorted { prologue: String },

    #[error("{prologue} refers to a missing file {path}")]
    MissingFile { prologue: String, path: String },

    #[error("{prologue} do not all match")]
    FilesDiffer { prologue: String },

    #[error("{workflow} subdir CI events do not match")]
    EventsDiffer { workflow: String },

    #[error("{workflow} subdir CI workflow_dispatch option mismatch: {option}")]
    OptionDiffers { workflow: String, option: String },

    #[error("{scope} workflow_dispatch defines additional options than expected: {}", .options.join(", "))]
    ExtraOptions { scope: String, options: Vec<String> },

    #[error("{scope} workflow_dispatch is missing expected options: {}", .options.join(", "))]
    MissingOptions { scope: String, options: Vec<String> },

    #[error("{scope} workflow_dispatch has lines outside any option: {}", .lines.join(" | "))]
    StrayDispatchLines { scope: String, lines: Vec<String> },

    #[error("{workflow} subdir CI concurrency does not match")]
    ConcurrencyDiffers { workflow: String },

    #[error("{workflow} subdir CI jobs do not match")]
    JobsDiffer { workflow: String },
}

/// Accumulated mismatches of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub mismatches: Vec<Mismatch>,
}

impl SyncReport {
    pub fn merge(&mut self, mismatches: Vec<Mismatch>) {
        self.mismatches.extend(mismatches);
    }

    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}
