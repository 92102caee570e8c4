//! Task execution commands (compile, test, check, run) and task listing

use anyhow::{bail, Result};

use super::output::Output;
use crate::domain::{
    ActionRunner, BuildDefinition, BuildReport, EdgeKind, CHECK, FUNCTIONAL_TEST_TASK, TEST_TASK,
};
use crate::engine::{DryRunRunner, ProcessRunner};
use crate::storage::Project;

/// Named entry points mapped onto task names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Compile every source set
    Compile,
    Test,
    FunctionalTest,
    Check,
}

impl Target {
    fn tasks(&self, build: &BuildDefinition) -> Vec<String> {
        match self {
            Target::Compile => build
                .source_sets
                .iter()
                .map(|s| s.compile_task_name())
                .collect(),
            Target::Test => vec![TEST_TASK.to_string()],
            Target::FunctionalTest => vec![FUNCTIONAL_TEST_TASK.to_string()],
            Target::Check => vec![CHECK.to_string()],
        }
    }
}

/// Runs one of the named entry points
pub fn run_target(output: &Output, target: Target, dry_run: bool) -> Result<()> {
    let project = Project::open_current()?;
    let build = project.definition()?;
    let tasks = target.tasks(&build);
    output.verbose_ctx("build", &format!("{:?} expands to {:?}", target, tasks));

    execute(output, &project, &build, &tasks, dry_run)
}

/// Runs arbitrary tasks by name
pub fn run_tasks(output: &Output, tasks: &[String], dry_run: bool) -> Result<()> {
    let project = Project::open_current()?;
    let build = project.definition()?;

    execute(output, &project, &build, tasks, dry_run)
}

fn execute(
    output: &Output,
    project: &Project,
    build: &BuildDefinition,
    tasks: &[String],
    dry_run: bool,
) -> Result<()> {
    let targets: Vec<&str> = tasks.iter().map(String::as_str).collect();

    if dry_run {
        let mut runner = DryRunRunner::new();
        let report = run_build(build, &targets, &mut runner)?;
        output.verbose_ctx("build", &format!("dry run planned {} tasks", runner.steps().len()));

        if output.is_json() {
            output.data(&runner.steps());
        } else {
            for step in runner.steps() {
                println!("{} ({})", step.task, step.action);
                if output.is_verbose() {
                    for entry in &step.classpath {
                        println!("    {}", entry);
                    }
                }
            }
        }
        return finish(output, &report);
    }

    let mut runner = ProcessRunner::new(project.root(), project.task_commands())
        .with_java_version(project.build_file().toolchain.java_version.clone());
    output.verbose_ctx(
        "build",
        &format!("running {:?} in {}", targets, project.root().display()),
    );
    let report = run_build(build, &targets, &mut runner)?;

    if output.is_json() {
        output.data(&report);
    } else {
        for result in &report.results {
            output.task_result(result);
        }
        output.blank();
    }
    finish(output, &report)
}

/// Runs the build, labelling errors that stop it before any task runs
fn run_build(build: &BuildDefinition, targets: &[&str], runner: &mut dyn ActionRunner) -> Result<BuildReport> {
    build.run(targets, runner).map_err(|e| {
        if e.is_configuration_error() {
            anyhow::Error::new(e).context(format!("Cannot plan {}", targets.join(", ")))
        } else {
            e.into()
        }
    })
}

fn finish(output: &Output, report: &BuildReport) -> Result<()> {
    output.verbose_ctx("build", &format!("executed: {}", report.executed().join(", ")));
    match &report.first_failure {
        None => {
            if !output.is_json() {
                println!("BUILD SUCCESSFUL");
            }
            Ok(())
        }
        Some(task) => bail!("Build failed: task '{}' failed", task),
    }
}

/// Lists every registered task
pub fn list(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let build = project.definition()?;
    output.verbose_ctx("tasks", &format!("{} tasks registered", build.tasks.len()));

    if output.is_json() {
        let items: Vec<_> = build
            .tasks
            .tasks()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "action": t.action.label(),
                    "group": t.group,
                    "description": t.description,
                    "depends_on": build.tasks.prerequisites(&t.name, EdgeKind::DependsOn),
                    "should_run_after": build.tasks.prerequisites(&t.name, EdgeKind::ShouldRunAfter),
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    println!("{:<28} {:<14} DESCRIPTION", "TASK", "GROUP");
    println!("{}", "-".repeat(70));
    for task in build.tasks.tasks() {
        println!(
            "{:<28} {:<14} {}",
            task.name,
            task.group.as_deref().unwrap_or("build"),
            task.description.as_deref().unwrap_or("")
        );
        if output.is_verbose() {
            let depends = build.tasks.prerequisites(&task.name, EdgeKind::DependsOn);
            if !depends.is_empty() {
                output.row(&["", "depends on:", depends.join(", ").as_str()]);
            }
            let after = build.tasks.prerequisites(&task.name, EdgeKind::ShouldRunAfter);
            if !after.is_empty() {
                output.row(&["", "runs after:", after.join(", ").as_str()]);
            }
        }
    }

    Ok(())
}
