use anyhow::{bail, Context};
use clap::Parser;
use drake_examples_tools::config::{UpgradeConfig, DEFAULT_MODULE_URL};
use drake_examples_tools::upgrade::{
    check_packages, upgrade_packages, HttpFetcher, ProcessRunner, UpgradeRequest,
};
use drake_examples_tools::utils::{init_logging, project_root};
use std::path::PathBuf;

/// Upgrades the `WITH_USER_*` dependencies of drake_cmake_external to the
/// versions Drake uses.
///
/// Without packages, reports which packages can be upgraded.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Packages to upgrade (eigen, fmt, spdlog)
    packages: Vec<String>,

    /// Commit each upgrade with git instead of printing the commands
    #[arg(long, requires = "packages")]
    commit: bool,

    /// Upgrade to this version instead of Drake's (single package only)
    #[arg(long, value_name = "VERSION", requires = "packages")]
    to_version: Option<String>,

    /// Print the version report as JSON
    #[arg(long, conflicts_with = "packages")]
    json: bool,

    /// Location of Drake's MODULE.bazel
    #[arg(long, env = "DRAKE_MODULE_URL", default_value = DEFAULT_MODULE_URL)]
    manifest_url: String,

    /// CMake file to rewrite [default: <root>/drake_cmake_external/CMakeLists.txt]
    #[arg(long, env = "DRAKE_CMAKE_EXTERNAL_FILE")]
    build_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let args = Args::parse();

    let mut config = UpgradeConfig::for_root(&project_root());
    config.manifest_url = args.manifest_url;
    if let Some(build_file) = args.build_file {
        config.build_file = build_file;
    }

    let fetcher = HttpFetcher::new();

    if args.packages.is_empty() {
        let report = check_packages(&fetcher, &config)
            .await
            .context("Failed to check package versions")?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        let outdated: Vec<_> = report.iter().filter(|info| info.needs_upgrade).collect();
        if outdated.is_empty() {
            println!("no upgrades possible");
        }
        for info in outdated {
            println!(
                "{} needs upgrade from {} to {}",
                info.package, info.current_version, info.drake_version
            );
        }
        return Ok(());
    }

    if args.to_version.is_some() && args.packages.len() != 1 {
        bail!("--to-version requires exactly one package");
    }

    let request = UpgradeRequest {
        packages: args.packages,
        version: args.to_version,
        commit: args.commit,
    };
    upgrade_packages(&fetcher, &ProcessRunner, &config, &request)
        .await
        .context("Upgrade failed")?;

    Ok(())
}
