use clap::Parser;
use drake_examples_tools::config::SyncConfig;
use drake_examples_tools::sync::run_checks;
use drake_examples_tools::utils::{init_logging, project_root};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};

/// Checks that files copied between the drake examples, and the examples'
/// GitHub workflows, are kept in sync.
///
/// The project root is `$DRAKE_EXAMPLES_ROOT` when set.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let _args = Args::parse();

    let root = project_root();
    if let Err(e) = std::env::set_current_dir(&root) {
        error!("Cannot enter project root {}: {}", root.display(), e);
        return ExitCode::FAILURE;
    }
    info!("Checking file sync in {}", root.display());

    match run_checks(&SyncConfig::default(), Path::new("")).await {
        Ok(report) if report.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
