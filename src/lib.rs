pub mod config;
pub mod sync;
pub mod upgrade;
pub mod utils;

// Re-export commonly used types
pub use config::{SyncConfig, UpgradeConfig};
pub use sync::{
    check_group, check_workflow, run_checks, FileGroup, Mismatch, SyncError, SyncReport,
    WorkflowDocument, WorkflowOptionsTable, WorkflowTriple,
};
pub use upgrade::{
    apply_upgrade, check_packages, commit_change, decide_upgrade, extract_version,
    fetch_reference_version, find_current_version, upgrade_packages, AppliedUpgrade,
    CommandRunner, Fetcher, HttpFetcher, PackageVersionInfo, ProcessRunner, ReferenceManifest,
    UpgradeError, UpgradeRequest,
};
