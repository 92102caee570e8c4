//! Build definition
//!
//! Ties the source set registry, the configuration graph and the task graph
//! together. A definition is assembled once per invocation, then only read
//! while tasks run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::configuration::ConfigurationGraph;
use super::coordinate::{Dependency, DependencyCoordinate};
use super::error::BuildError;
use super::report::BuildReport;
use super::source_set::{ClasspathEntry, SourceSet, SourceSetRegistry, FUNCTIONAL_TEST, MAIN, TEST};
use super::task_graph::{BuildTask, TaskAction, TaskGraph};

pub const CHECK: &str = "check";
pub const TEST_TASK: &str = "test";
pub const FUNCTIONAL_TEST_TASK: &str = "functionalTest";
pub const VERIFICATION_GROUP: &str = "verification";

/// Everything a runner needs to perform one task's action
#[derive(Debug, Clone)]
pub struct TaskInvocation<'a> {
    pub task: &'a BuildTask,
    pub source_dirs: &'a [PathBuf],
    pub output_dir: Option<&'a Path>,
    pub classpath: Vec<ClasspathEntry>,
}

/// Performs task actions on behalf of the build
///
/// This is the seam to the external compiler and test runner.
pub trait ActionRunner {
    fn run(&mut self, invocation: &TaskInvocation<'_>) -> Result<(), BuildError>;
}

/// The complete model of one build
#[derive(Debug, Default)]
pub struct BuildDefinition {
    pub source_sets: SourceSetRegistry,
    pub configurations: ConfigurationGraph,
    pub tasks: TaskGraph,

    /// Platform pins keyed by `group:artifact`
    managed_versions: BTreeMap<String, String>,
}

impl BuildDefinition {
    /// Creates the web-service layout: `main`, `test` and `functionalTest`
    /// source sets, their configurations, and the compile/test/check tasks
    pub fn standard() -> Result<Self, BuildError> {
        Self::standard_in("build")
    }

    /// Like [`standard`](Self::standard) with outputs under `build_dir`
    pub fn standard_in(build_dir: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let mut build = Self {
            source_sets: SourceSetRegistry::new(build_dir),
            ..Self::default()
        };

        build.add_source_set(MAIN, vec![], &[])?;
        build.add_source_set(TEST, vec![], &[MAIN])?;
        build.add_source_set(FUNCTIONAL_TEST, vec![], &[MAIN, TEST])?;

        let configs = &mut build.configurations;
        configs.extends_from("testImplementation", "implementation")?;
        configs.extends_from("testRuntimeOnly", "runtimeOnly")?;
        configs.extends_from("functionalTestImplementation", "implementation")?;
        configs.extends_from("functionalTestImplementation", "testImplementation")?;
        configs.extends_from("functionalTestRuntimeOnly", "testRuntimeOnly")?;

        build.add_test_task(TEST_TASK, TEST, "Runs the unit tests.")?;
        build.add_test_task(FUNCTIONAL_TEST_TASK, FUNCTIONAL_TEST, "Runs functional tests.")?;
        build
            .tasks
            .should_run_after(FUNCTIONAL_TEST_TASK, TEST_TASK)?;

        build.tasks.register(
            BuildTask::new(CHECK, TaskAction::Aggregate)
                .with_description("Runs all checks.")
                .with_group(VERIFICATION_GROUP),
        )?;
        build.tasks.depends_on(CHECK, TEST_TASK)?;
        build.tasks.depends_on(CHECK, FUNCTIONAL_TEST_TASK)?;

        Ok(build)
    }

    /// Defines a source set with its two configurations and compile task
    ///
    /// The compile task depends on the compile tasks of every extended source set.
    pub fn add_source_set(
        &mut self,
        name: &str,
        source_dirs: Vec<PathBuf>,
        extends: &[&str],
    ) -> Result<(), BuildError> {
        let source_set = self.source_sets.define(name, source_dirs, extends)?.clone();

        self.configurations
            .create(&source_set.implementation_configuration());
        self.configurations
            .create(&source_set.runtime_only_configuration());

        let compile_task = source_set.compile_task_name();
        self.tasks.register(
            BuildTask::new(
                compile_task.clone(),
                TaskAction::Compile {
                    source_set: name.to_string(),
                },
            )
            .with_description(format!("Compiles {} Java source.", name)),
        )?;

        for parent in extends {
            let parent_task = self.source_sets.get(parent)?.compile_task_name();
            self.tasks.depends_on(&compile_task, &parent_task)?;
        }

        Ok(())
    }

    /// Makes an existing source set compile against `parent`'s output
    ///
    /// Adds the matching edge between the two compile tasks, so the parent's
    /// output exists before it lands on the classpath.
    pub fn extend_source_set(&mut self, name: &str, parent: &str) -> Result<(), BuildError> {
        self.source_sets.extend(name, parent)?;

        let compile_task = self.source_sets.get(name)?.compile_task_name();
        let parent_task = self.source_sets.get(parent)?.compile_task_name();
        self.tasks.depends_on(&compile_task, &parent_task)
    }

    /// Registers a test task for a source set, depending on its compilation
    pub fn add_test_task(&mut self, name: &str, source_set: &str, description: &str) -> Result<(), BuildError> {
        let compile_task = self.source_sets.get(source_set)?.compile_task_name();

        self.tasks.register(
            BuildTask::new(
                name,
                TaskAction::RunTests {
                    source_set: source_set.to_string(),
                },
            )
            .with_description(description)
            .with_group(VERIFICATION_GROUP),
        )?;
        self.tasks.depends_on(name, &compile_task)
    }

    /// Declares a dependency in a configuration
    pub fn declare(&mut self, configuration: &str, dependency: impl Into<Dependency>) -> Result<(), BuildError> {
        self.configurations.declare(configuration, dependency)
    }

    /// Pins the version used for declarations that omit one
    pub fn manage_version(&mut self, module: impl Into<String>, version: impl Into<String>) {
        self.managed_versions.insert(module.into(), version.into());
    }

    pub fn managed_version(&self, coordinate: &DependencyCoordinate) -> Option<&str> {
        self.managed_versions
            .get(&coordinate.module_key())
            .map(String::as_str)
    }

    /// Applies platform pins to a coordinate
    pub fn resolve_version(
        &self,
        coordinate: &DependencyCoordinate,
        configuration: &str,
    ) -> Result<DependencyCoordinate, BuildError> {
        if !coordinate.is_managed() {
            return Ok(coordinate.clone());
        }
        self.managed_version(coordinate)
            .map(|v| coordinate.with_version(v))
            .ok_or_else(|| BuildError::UnresolvedDependency {
                coordinate: coordinate.to_string(),
                configuration: configuration.to_string(),
            })
    }

    /// Resolves a configuration to concrete artifacts, in declaration order
    pub fn resolve_artifacts(&self, configuration: &str) -> Result<Vec<DependencyCoordinate>, BuildError> {
        if !self.configurations.contains(configuration) {
            return Err(BuildError::UnknownConfiguration(configuration.to_string()));
        }
        self.configurations
            .resolve_dependencies(configuration)
            .iter()
            .map(|d| self.resolve_version(&d.coordinate, configuration))
            .collect()
    }

    /// Classpath used to compile a source set: outputs of the extended
    /// source sets, then its compile dependencies
    pub fn compile_classpath(&self, source_set: &str) -> Result<Vec<ClasspathEntry>, BuildError> {
        let set = self.source_sets.get(source_set)?;
        let mut classpath = self.source_sets.extended_outputs(source_set)?;
        classpath.extend(self.artifact_entries(&set.implementation_configuration())?);
        Ok(classpath)
    }

    /// Classpath used to run a source set: its own output, the compile
    /// classpath, then runtime-only dependencies
    pub fn runtime_classpath(&self, source_set: &str) -> Result<Vec<ClasspathEntry>, BuildError> {
        let set = self.source_sets.get(source_set)?;
        let mut classpath = vec![set.output()];
        classpath.extend(self.compile_classpath(source_set)?);
        classpath.extend(self.artifact_entries(&set.runtime_only_configuration())?);
        Ok(classpath)
    }

    fn artifact_entries(&self, configuration: &str) -> Result<Vec<ClasspathEntry>, BuildError> {
        Ok(self
            .resolve_artifacts(configuration)?
            .into_iter()
            .map(|coordinate| ClasspathEntry::Artifact { coordinate })
            .collect())
    }

    /// Every declared coordinate across all configurations, with platform
    /// pins applied where available
    pub fn declared_coordinates(&self) -> Vec<DependencyCoordinate> {
        let mut out = Vec::new();
        for name in self.configurations.names() {
            let Some(config) = self.configurations.get(name) else {
                continue;
            };
            for dependency in config.dependencies() {
                let coordinate = self
                    .resolve_version(&dependency.coordinate, name)
                    .unwrap_or_else(|_| dependency.coordinate.clone());
                out.push(coordinate);
            }
        }
        out
    }

    /// Runs the target tasks, handing each action to `runner`
    ///
    /// Classpaths are resolved per task as it starts; a dependency that
    /// cannot be resolved fails only the tasks that need it.
    pub fn run(&self, targets: &[&str], runner: &mut dyn ActionRunner) -> Result<BuildReport, BuildError> {
        let mut executor = |task: &BuildTask| -> Result<(), BuildError> {
            let invocation = self.invocation(task)?;
            runner.run(&invocation)
        };
        self.tasks.run(targets, &mut executor)
    }

    /// Builds the invocation for a task, resolving its classpath
    pub fn invocation<'a>(&'a self, task: &'a BuildTask) -> Result<TaskInvocation<'a>, BuildError> {
        let source_set: Option<&SourceSet> = match task.action.source_set() {
            Some(name) => Some(self.source_sets.get(name)?),
            None => None,
        };

        let classpath = match &task.action {
            TaskAction::Compile { source_set } => self.compile_classpath(source_set)?,
            TaskAction::RunTests { source_set } => self.runtime_classpath(source_set)?,
            TaskAction::Aggregate => Vec::new(),
        };

        Ok(TaskInvocation {
            task,
            source_dirs: source_set.map(|s| s.source_dirs.as_slice()).unwrap_or(&[]),
            output_dir: source_set.map(|s| s.output_dir.as_path()),
            classpath,
        })
    }
}
