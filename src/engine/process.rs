//! Runners that perform task actions

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::domain::{ActionRunner, BuildError, TaskAction, TaskInvocation};

/// Runs the shell command configured for each task
///
/// Tasks without a command succeed without doing anything, which is how
/// aggregate tasks such as `check` behave.
pub struct ProcessRunner {
    /// Working directory for every command
    root: PathBuf,

    /// Task name -> shell command
    commands: HashMap<String, String>,

    /// Toolchain pin exported to commands
    java_version: Option<String>,
}

impl ProcessRunner {
    pub fn new(root: impl Into<PathBuf>, commands: HashMap<String, String>) -> Self {
        Self {
            root: root.into(),
            commands,
            java_version: None,
        }
    }

    pub fn with_java_version(mut self, version: Option<String>) -> Self {
        self.java_version = version;
        self
    }

    /// Returns the command configured for a task
    pub fn command(&self, task: &str) -> Option<&str> {
        self.commands.get(task).map(String::as_str)
    }

    fn build_command(&self, command: &str, invocation: &TaskInvocation<'_>) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C");
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c");
            cmd
        };

        cmd.arg(command)
            .current_dir(&self.root)
            .env("BUILDPLAN_TASK", &invocation.task.name)
            .env("BUILDPLAN_ACTION", invocation.task.action.label())
            .env("BUILDPLAN_CLASSPATH", join_entries(&invocation.classpath))
            .env("BUILDPLAN_SOURCE_DIRS", join_entries(invocation.source_dirs.iter().map(|d| d.display())))
            .env(
                "BUILDPLAN_OUTPUT_DIR",
                invocation.output_dir.map(Path::display).map(|d| d.to_string()).unwrap_or_default(),
            );
        if let Some(version) = &self.java_version {
            cmd.env("BUILDPLAN_JAVA_VERSION", version);
        }
        cmd
    }
}

/// Level at which a task's captured output is echoed
///
/// Test output shows at the default filter, everything else with `--verbose`.
fn output_level(action: &TaskAction) -> log::Level {
    match action {
        TaskAction::RunTests { .. } => log::Level::Info,
        TaskAction::Compile { .. } | TaskAction::Aggregate => log::Level::Debug,
    }
}

fn join_entries<T: ToString>(entries: impl IntoIterator<Item = T>) -> String {
    entries
        .into_iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(":")
}

impl ActionRunner for ProcessRunner {
    fn run(&mut self, invocation: &TaskInvocation<'_>) -> Result<(), BuildError> {
        let task = &invocation.task.name;
        let Some(command) = self.commands.get(task) else {
            log::debug!("{}: no command configured", task);
            return Ok(());
        };

        log::info!("{}: running `{}`", task, command);
        let output = self
            .build_command(command, invocation)
            .output()
            .map_err(|e| BuildError::TaskExecutionFailure {
                task: task.clone(),
                message: format!("failed to spawn `{}`: {}", command, e),
            })?;

        let level = output_level(&invocation.task.action);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines() {
            log::log!(level, "{}> {}", task, line);
        }
        for line in stderr.lines() {
            log::log!(level, "{}! {}", task, line);
        }

        if !output.status.success() {
            let detail = stderr.trim();
            let status = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "signal".to_string(),
            };
            let message = if detail.is_empty() {
                format!("`{}` failed with {}", command, status)
            } else {
                format!("`{}` failed with {}:\n{}", command, status, detail)
            };
            return Err(BuildError::TaskExecutionFailure {
                task: task.clone(),
                message,
            });
        }

        Ok(())
    }
}

/// One task as the dry run saw it
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlannedStep {
    pub task: String,
    pub action: String,
    pub classpath: Vec<String>,
}

/// Records invocations instead of running them
#[derive(Debug, Default)]
pub struct DryRunRunner {
    steps: Vec<PlannedStep>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }
}

impl ActionRunner for DryRunRunner {
    fn run(&mut self, invocation: &TaskInvocation<'_>) -> Result<(), BuildError> {
        self.steps.push(PlannedStep {
            task: invocation.task.name.clone(),
            action: invocation.task.action.label().to_string(),
            classpath: invocation.classpath.iter().map(|e| e.to_string()).collect(),
        });
        Ok(())
    }
}
