//! Compiled-in tables for both maintenance tools.
//!
//! The file groups, workflow names and dispatch options describe the layout of
//! the examples repository. They are edited here, alongside the repository
//! changes that require them.

use crate::sync::{FileGroup, WorkflowOptionsTable};
use std::path::{Path, PathBuf};

/// Files that are exact copies of each other across the example directories.
const COPIES: &[&[&str]] = &[
    &[
        "drake_bazel_download/.clang-format",
        "drake_bazel_external/.clang-format",
        "drake_cmake_external/.clang-format",
        "drake_cmake_installed/.clang-format",
        "drake_cmake_installed_apt/.clang-format",
    ],
    &[
        "drake_bazel_download/.github/ubuntu_setup",
        "drake_cmake_installed/.github/ubuntu_setup",
    ],
    &[
        "drake_bazel_download/CPPLINT.cfg",
        "drake_bazel_external/CPPLINT.cfg",
        "drake_cmake_external/CPPLINT.cfg",
        "drake_cmake_installed/CPPLINT.cfg",
        "drake_cmake_installed_apt/CPPLINT.cfg",
    ],
    &[
        "LICENSE",
        "drake_bazel_download/LICENSE",
        "drake_bazel_external/LICENSE",
        "drake_cmake_external/LICENSE",
        "drake_cmake_installed/LICENSE",
        "drake_cmake_installed_apt/LICENSE",
        "drake_pip/LICENSE",
        "drake_poetry/LICENSE",
    ],
    &[
        "drake_bazel_external/.github/ubuntu_setup",
        "drake_cmake_external/.github/ubuntu_setup",
    ],
    &[
        "drake_bazel_download/.bazelversion",
        "drake_bazel_external/.bazelversion",
    ],
];

/// Files shared by the current and legacy bazel_external examples.
const BAZEL_EXTERNAL_LEGACY_COPIES: &[&str] = &[
    ".bazelignore",
    ".bazelproject",
    ".clang-format",
    ".github/setup",
    ".github/ubuntu_setup",
    "BUILD.bazel",
    "CPPLINT.cfg",
    "LICENSE",
    "apps/BUILD.bazel",
    "apps/exec.sh",
    "apps/find_resource_test.py",
    "apps/import_all_test.py",
    "apps/simple_adder-inl.h",
    "apps/simple_adder.cc",
    "apps/simple_adder.h",
    "apps/simple_adder_py.cc",
    "apps/simple_adder_py_test.py",
    "apps/simple_adder_test.cc",
    "apps/simple_continuous_time_system.cc",
    "apps/simple_logging_example.py",
    "setup/install_prereqs",
];

/// C++ particle sources shared by the installed CMake examples.
const PARTICLE_CC_COPIES: &[&str] = &["CMakeLists.txt", "particle.cc", "particle.h", "particle_test.cc"];

/// Python particle sources shared by the installed and pip/poetry examples.
const PARTICLE_PY_COPIES: &[&str] = &["particle.py", "particle_test.py"];

/// Examples with a standalone GitHub workflow derived from the root CI file.
const GITHUB_WORKFLOWS: &[&str] = &[
    "bazel_download",
    "cmake_installed",
    "cmake_installed_apt",
    "pip",
    "poetry",
];

/// Dispatch options recognised for each workflow.
const GITHUB_WORKFLOW_OPTS: &[(&str, &[&str])] = &[
    ("bazel_download", &["linux_noble_package_tar"]),
    (
        "cmake_installed",
        &["linux_noble_package_tar", "mac_arm_sonoma_package_tar"],
    ),
    ("cmake_installed_apt", &["linux_noble_package_deb"]),
    ("pip", &["linux_noble_wheel", "mac_arm_sonoma_wheel"]),
    ("poetry", &["linux_noble_wheel", "mac_arm_sonoma_wheel"]),
];

/// Default location of Drake's Bazel module file.
pub const DEFAULT_MODULE_URL: &str =
    "https://raw.githubusercontent.com/RobotLocomotion/drake/master/MODULE.bazel";

/// Build file holding the `ExternalProject_Add` pins, relative to the root.
pub const CMAKE_EXTERNAL_FILE: &str = "drake_cmake_external/CMakeLists.txt";

/// Upstream packages the upgrader is allowed to touch.
pub const UPGRADABLE_PACKAGES: &[&str] = &["eigen", "fmt", "spdlog"];

/// Configuration of the consistency checker
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub groups: Vec<FileGroup>,
    pub workflows: Vec<String>,
    pub workflow_options: WorkflowOptionsTable,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let mut groups: Vec<FileGroup> = COPIES
            .iter()
            .map(|paths| FileGroup::new(paths.iter().copied()))
            .collect();

        groups.extend(BAZEL_EXTERNAL_LEGACY_COPIES.iter().map(|path| {
            FileGroup::new([
                format!("drake_bazel_external/{path}"),
                format!("drake_bazel_external_legacy/{path}"),
            ])
        }));

        groups.extend(PARTICLE_CC_COPIES.iter().map(|path| {
            FileGroup::new([
                format!("drake_cmake_installed/src/particle/{path}"),
                format!("drake_cmake_installed_apt/src/{path}"),
            ])
        }));

        groups.extend(PARTICLE_PY_COPIES.iter().map(|path| {
            FileGroup::new([
                format!("drake_cmake_installed/src/particle/{path}"),
                format!("drake_cmake_installed_apt/src/{path}"),
                format!("drake_pip/src/{path}"),
                format!("drake_poetry/src/{path}"),
            ])
        }));

        Self {
            groups,
            workflows: GITHUB_WORKFLOWS.iter().map(|w| w.to_string()).collect(),
            workflow_options: WorkflowOptionsTable::from_entries(GITHUB_WORKFLOW_OPTS),
        }
    }
}

/// Configuration of the dependency upgrader
#[derive(Debug, Clone)]
pub struct UpgradeConfig {
    /// Project root, used as the git working directory
    pub root: PathBuf,
    /// CMake file rewritten in place
    pub build_file: PathBuf,
    /// Reference manifest listing Drake's own dependency versions
    pub manifest_url: String,
    /// Allow-list of packages, in reporting order
    pub packages: Vec<String>,
}

impl UpgradeConfig {
    /// Defaults for a project rooted at `root`
    pub fn for_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            build_file: root.join(CMAKE_EXTERNAL_FILE),
            manifest_url: DEFAULT_MODULE_URL.to_string(),
            packages: UPGRADABLE_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }
}
