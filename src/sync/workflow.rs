use super::document::{jobs_section, option_names, AnchorError, OptionBlock, WorkflowDocument};
use super::types::{Mismatch, WorkflowOptionsTable, WorkflowTriple};
use super::SyncError;
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;

async fn read_workflow_file(workflow: &str, path: &Path) -> Result<String, SyncError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| SyncError::MissingWorkflowFile {
            workflow: workflow.to_string(),
            path: path.display().to_string(),
            source,
        })
}

fn anchor_error(workflow: &str, path: &Path, error: AnchorError) -> SyncError {
    let path = path.display().to_string();
    let workflow = workflow.to_string();
    match error {
        AnchorError::Count { anchor, count } => SyncError::MalformedAnchor {
            workflow,
            path,
            anchor: anchor.marker(),
            count,
        },
        AnchorError::OutOfOrder => SyncError::AnchorsOutOfOrder { workflow, path },
    }
}

fn find_block<'a, 'b>(blocks: &'b [OptionBlock<'a>], name: &str) -> Option<&'b OptionBlock<'a>> {
    blocks.iter().find(|b| b.name == name)
}

fn sorted_difference(names: &BTreeSet<&str>, expected: &BTreeSet<String>) -> Vec<String> {
    names
        .iter()
        .filter(|n| !expected.contains(**n))
        .map(|n| n.to_string())
        .collect()
}

/// Check one workflow triple.
///
/// The root CI template and the composed subdirectory file must agree on the
/// trigger events, on the dispatch options recognised for this workflow, and
/// on concurrency; the subdirectory file and the standalone workflow must
/// agree on jobs. Dispatch lines outside every option block are reported. Unreadable files and malformed anchors are fatal.
pub async fn check_workflow(
    triple: &WorkflowTriple,
    options: &WorkflowOptionsTable,
) -> Result<Vec<Mismatch>, SyncError> {
    let name = triple.name.as_str();
    let root_text = read_workflow_file(name, &triple.root).await?;
    let variant_text = read_workflow_file(name, &triple.variant).await?;
    let subdir_text = read_workflow_file(name, &triple.subdir).await?;

    let root = WorkflowDocument::parse(&root_text).map_err(|e| anchor_error(name, &triple.root, e))?;
    let subdir =
        WorkflowDocument::parse(&subdir_text).map_err(|e| anchor_error(name, &triple.subdir, e))?;
    let variant_jobs =
        jobs_section(&variant_text).map_err(|e| anchor_error(name, &triple.variant, e))?;

    let mut mismatches = Vec::new();

    if root.events() != subdir.events() {
        mismatches.push(Mismatch::EventsDiffer {
            workflow: name.to_string(),
        });
    }

    let root_blocks = root.option_blocks();
    let subdir_blocks = subdir.option_blocks();
    let recognised = options.options_for(name);

    for option in recognised {
        let root_block = find_block(&root_blocks, option).map(|b| b.text);
        let subdir_block = find_block(&subdir_blocks, option).map(|b| b.text);
        if root_block.is_none() || root_block != subdir_block {
            mismatches.push(Mismatch::OptionDiffers {
                workflow: name.to_string(),
                option: option.clone(),
            });
        }
    }

    let all_options = options.all_options();
    let root_names = option_names(&root_blocks);
    let extra = sorted_difference(&root_names, &all_options);
    if !extra.is_empty() {
        mismatches.push(Mismatch::ExtraOptions {
            scope: "Root CI".to_string(),
            options: extra,
        });
    }
    let missing: Vec<String> = all_options
        .iter()
        .filter(|o| !root_names.contains(o.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        mismatches.push(Mismatch::MissingOptions {
            scope: "Root CI".to_string(),
            options: missing,
        });
    }

    let own_options: BTreeSet<String> = recognised.iter().cloned().collect();
    let extra = sorted_difference(&option_names(&subdir_blocks), &own_options);
    if !extra.is_empty() {
        mismatches.push(Mismatch::ExtraOptions {
            scope: format!("{name} subdir CI"),
            options: extra,
        });
    }

    let dispatch_scopes = [
        ("Root CI".to_string(), &root),
        (format!("{name} subdir CI"), &subdir),
    ];
    for (scope, document) in dispatch_scopes {
        let stray = document.stray_dispatch_lines();
        if !stray.is_empty() {
            mismatches.push(Mismatch::StrayDispatchLines {
                scope,
                lines: stray.iter().map(|line| line.trim().to_string()).collect(),
            });
        }
    }

    if root.concurrency() != subdir.concurrency() {
        mismatches.push(Mismatch::ConcurrencyDiffers {
            workflow: name.to_string(),
        });
    }

    if subdir.jobs() != variant_jobs {
        mismatches.push(Mismatch::JobsDiffer {
            workflow: name.to_string(),
        });
    }

    Ok(mismatches)
}
