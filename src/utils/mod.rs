mod hash;

pub use hash::compute_hash;

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable overriding the project root
pub const ROOT_ENV_VAR: &str = "DRAKE_EXAMPLES_ROOT";

/// Resolve the project root: `$DRAKE_EXAMPLES_ROOT`, else the directory
/// holding this crate's manifest.
pub fn project_root() -> PathBuf {
    match std::env::var_os(ROOT_ENV_VAR) {
        Some(root) if !root.is_empty() => PathBuf::from(root),
        _ => PathBuf::from(env!("CARGO_MANIFEST_DIR")),
    }
}

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info`.
pub fn init_logging() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Replace a file's contents atomically using temp file + rename
pub async fn write_atomic(path: &Path, content: &str) -> Result<(), std::io::Error> {
    let mut temp_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}
