use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Captured result of an external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, absent when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv[0]` with the remaining arguments inside `cwd`.
    async fn run(&self, argv: &[String], cwd: &Path) -> Result<CommandOutput, CommandError>;
}

/// [`CommandRunner`] spawning real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, argv: &[String], cwd: &Path) -> Result<CommandOutput, CommandError> {
        let (program, args) = argv.split_first().ok_or_else(|| CommandError::Spawn {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Quote an argument for display in a POSIX shell.
fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@+,".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Render a command line the way a user would type it.
pub fn display_command(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The git invocations recording an upgrade of `package` to `version`.
pub fn commit_commands(package: &str, version: &str, file: &Path) -> Vec<Vec<String>> {
    let file = file.display().to_string();
    vec![
        vec!["git".to_string(), "add".to_string(), file.clone()],
        vec![
            "git".to_string(),
            "commit".to_string(),
            "-m".to_string(),
            format!("[drake_cmake_external] Upgrade {package} to {version}"),
            file,
        ],
    ]
}

/// Commit the rewritten build file, or print the commands to do so.
///
/// `file` is given relative to `repo_root`, where the commands run.
pub async fn commit_change(
    runner: &dyn CommandRunner,
    repo_root: &Path,
    package: &str,
    version: &str,
    file: &Path,
    actually_commit: bool,
) -> Result<(), CommandError> {
    let commands = commit_commands(package, version, file);

    if !actually_commit {
        println!("To commit this upgrade, run:");
        for argv in &commands {
            println!("  {}", display_command(argv));
        }
        return Ok(());
    }

    for argv in &commands {
        let output = runner.run(argv, repo_root).await?;
        if !output.success {
            return Err(CommandError::Failed {
                command: display_command(argv),
                status: output
                    .code
                    .map_or_else(|| "signal".to_string(), |c| format!("status {c}")),
                stderr: output.stderr.trim().to_string(),
            });
        }
    }

    Ok(())
}
