//! Consistency checks for files duplicated across the example directories.
//!
//! Two kinds of checks run against the project root:
//!
//! - file groups, whose members must be byte-identical copies
//! - GitHub workflows, where each example's composed CI file must agree with
//!   the root CI template and with its standalone workflow
//!
//! Content mismatches are collected into a [`SyncReport`]. Missing workflow
//! files and malformed workflow anchors abort the run with a [`SyncError`].

mod document;
mod groups;
mod types;
mod workflow;

pub use document::{
    jobs_section, option_blocks, stray_dispatch_lines, Anchor, AnchorError, OptionBlock, WorkflowDocument, INDENT_STEP,
    OPTION_INDENT,
};
pub use groups::{check_group, ordinalize};
pub use types::{FileGroup, Mismatch, SyncReport, WorkflowOptionsTable, WorkflowTriple};
pub use workflow::check_workflow;

use crate::config::SyncConfig;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Missing {workflow} file {path}: {source}")]
    MissingWorkflowFile {
        workflow: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{workflow}'s {path} contents are invalid: expected {anchor:?} exactly once, found {count}")]
    MalformedAnchor {
        workflow: String,
        path: String,
        anchor: &'static str,
        count: usize,
    },

    #[error("{workflow}'s {path} contents are invalid: workflow_dispatch, concurrency and jobs are out of order")]
    AnchorsOutOfOrder { workflow: String, path: String },
}

fn log_mismatches(mismatches: &[Mismatch]) {
    for mismatch in mismatches {
        error!("{}", mismatch);
    }
}

/// Run every configured check against `root`.
///
/// Mismatches are logged as soon as each check completes and returned merged.
/// The first fatal error stops the run.
pub async fn run_checks(config: &SyncConfig, root: &Path) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::default();

    for (index, group) in config.groups.iter().enumerate() {
        let mismatches = check_group(index, group, root).await;
        log_mismatches(&mismatches);
        report.merge(mismatches);
    }

    for name in &config.workflows {
        let triple = WorkflowTriple::for_workflow(name).under(root);
        let mismatches = check_workflow(&triple, &config.workflow_options).await?;
        log_mismatches(&mismatches);
        report.merge(mismatches);
    }

    info!(
        groups = config.groups.len(),
        workflows = config.workflows.len(),
        mismatches = report.mismatches.len(),
        "File sync check finished"
    );

    Ok(report)
}
