#![allow(dead_code)]

use async_trait::async_trait;
use drake_examples_tools::upgrade::{
    CommandError, CommandOutput, CommandRunner, FetchError, Fetcher,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::fs;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write `content` at `root/relative`, creating parent directories
pub async fn write_file(root: &Path, relative: &str, content: impl AsRef<[u8]>) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .expect("Should create parent dirs");
    }
    fs::write(&path, content).await.expect("Should write file");
}

pub const EVENTS: &str = "name: ci\n\non:\n  push:\n    branches:\n      - main\n  pull_request:";

pub const CONCURRENCY: &str =
    "  group: ${{ github.workflow }}-${{ github.ref }}\n  cancel-in-progress: true\n";

/// A boolean `workflow_dispatch` input
pub fn option_block(name: &str) -> String {
    format!(
        "      {name}:\n        description: 'Run {name}'\n        type: boolean\n        default: false\n"
    )
}

/// Jobs section body for a workflow
pub fn jobs(name: &str) -> String {
    format!("  {name}:\n    runs-on: ubuntu-latest\n    steps:\n      - uses: actions/checkout@v4\n")
}

/// A composed CI file with the given dispatch option blocks and jobs body
pub fn composed_workflow(events: &str, options: &[String], concurrency: &str, jobs: &str) -> String {
    format!(
        "{events}\n  workflow_dispatch:\n    inputs:\n{}\nconcurrency:\n{concurrency}\njobs:\n{jobs}",
        options.concat()
    )
}

/// A standalone workflow sharing the given jobs body
pub fn standalone_workflow(name: &str, jobs: &str) -> String {
    format!("name: {name}\non:\n  schedule:\n    - cron: '0 6 * * *'\njobs:\n{jobs}")
}

/// Canned HTTP responses keyed by URL; unknown URLs return 404
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, Vec<u8>>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.to_string(), body.into());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Records invocations; fails every command whose argv contains `fail_on`
#[derive(Default)]
pub struct FakeRunner {
    pub fail_on: Option<String>,
    pub calls: Mutex<Vec<(Vec<String>, PathBuf)>>,
}

impl FakeRunner {
    pub fn calls(&self) -> Vec<(Vec<String>, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, argv: &[String], cwd: &Path) -> Result<CommandOutput, CommandError> {
        self.calls
            .lock()
            .unwrap()
            .push((argv.to_vec(), cwd.to_path_buf()));

        let failed = self
            .fail_on
            .as_ref()
            .is_some_and(|word| argv.iter().any(|arg| arg == word));

        Ok(CommandOutput {
            success: !failed,
            code: Some(if failed { 1 } else { 0 }),
            stdout: String::new(),
            stderr: if failed {
                "fatal: not a git repository".to_string()
            } else {
                String::new()
            },
        })
    }
}
