//! Project management
//!
//! Handles project initialization and turns `build.toml` into a
//! [`BuildDefinition`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{find_project_root, BuildFile, ConfigError, BUILD_FILE};
use super::feed::StaticVersionFeed;
use crate::domain::{BuildDefinition, BuildTask, TaskAction};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a buildplan project. Run 'buildplan init' first.")]
    NotInProject,

    #[error("No version feed configured. Set [updates] feed in build.toml.")]
    NoFeed,
}

const DEFAULT_BUILD_FILE: &str = r#"# buildplan build definition

plugins = [
    "java",
    "idea",
    "eclipse",
    "org.springframework.boot",
    "io.spring.dependency-management",
    "com.github.ben-manes.versions",
    "com.diffplug.spotless",
]
repositories = ["mavenCentral"]

[toolchain]
java_version = "21"

[dependencies]
implementation = [
    "org.springframework.boot:spring-boot-starter-web",
    "org.springdoc:springdoc-openapi-starter-webmvc-ui:2.2.0",
    "org.springframework.boot:spring-boot-starter-validation",
]
testImplementation = [
    { coordinate = "org.springframework.boot:spring-boot-starter-test", exclude = [{ group = "org.junit.vintage", module = "junit-vintage-engine" }] },
]

# Versions for dependencies declared without one
[managed_versions]
"org.springframework.boot:spring-boot-starter-web" = "3.2.0"
"org.springframework.boot:spring-boot-starter-validation" = "3.2.0"
"org.springframework.boot:spring-boot-starter-test" = "3.2.0"

[updates]
channel = "current"
feed = "versions.toml"

[formatter]
java = "palantir-java-format"
format_annotations = true
"#;

const DEFAULT_FEED: &str = r#"# Published versions consulted by 'buildplan dependency-updates'
[modules]
"#;

/// A buildplan project
pub struct Project {
    root: PathBuf,
    build_file: BuildFile,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(BUILD_FILE).is_file() {
            return Err(ProjectError::NotInProject.into());
        }

        let build_file = BuildFile::load(&root)?;

        Ok(Self { root, build_file })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let root = find_project_root(&cwd).ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left untouched.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        for dir in ["src/main/java", "src/test/java", "src/functional-test/java"] {
            let path = root.join(dir);
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create source directory: {}", path.display()))?;
        }

        let build_path = root.join(BUILD_FILE);
        if !build_path.exists() {
            fs::write(&build_path, DEFAULT_BUILD_FILE)
                .with_context(|| format!("Failed to write build file: {}", build_path.display()))?;
        }

        let feed_path = root.join("versions.toml");
        if !feed_path.exists() {
            fs::write(&feed_path, DEFAULT_FEED)
                .with_context(|| format!("Failed to write version feed: {}", feed_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the parsed build file
    pub fn build_file(&self) -> &BuildFile {
        &self.build_file
    }

    /// Shell commands configured per task
    pub fn task_commands(&self) -> HashMap<String, String> {
        self.build_file
            .tasks
            .iter()
            .filter_map(|(name, task)| task.command.clone().map(|c| (name.clone(), c)))
            .collect()
    }

    /// Loads the configured version feed
    pub fn version_feed(&self) -> Result<StaticVersionFeed> {
        let path = self
            .build_file
            .updates
            .feed
            .as_ref()
            .ok_or(ProjectError::NoFeed)?;
        StaticVersionFeed::load(&self.root.join(path))
    }

    /// Builds the full build model from the standard layout plus `build.toml`
    pub fn definition(&self) -> Result<BuildDefinition> {
        self.apply(BuildDefinition::standard_in(&self.build_file.build_dir)?)
            .context("Invalid build definition")
    }

    fn apply(&self, mut build: BuildDefinition) -> Result<BuildDefinition> {
        let file = &self.build_file;

        for source_set in &file.source_sets {
            if build.source_sets.get(&source_set.name).is_ok() {
                for dir in &source_set.dirs {
                    build.source_sets.add_source_dir(&source_set.name, dir.clone())?;
                }
                for parent in &source_set.extends {
                    let already = build
                        .source_sets
                        .get(&source_set.name)?
                        .extends()
                        .contains(parent);
                    if !already {
                        build.extend_source_set(&source_set.name, parent)?;
                    }
                }
            } else {
                let extends: Vec<&str> = source_set.extends.iter().map(String::as_str).collect();
                build.add_source_set(&source_set.name, source_set.dirs.clone(), &extends)?;
            }
        }

        for (child, parents) in &file.configurations {
            build.configurations.create(child);
            for parent in parents {
                build.configurations.extends_from(child, parent)?;
            }
        }

        for (configuration, specs) in &file.dependencies {
            for spec in specs {
                build.declare(configuration, spec.to_dependency())?;
            }
        }

        for (module, version) in &file.managed_versions {
            build.manage_version(module.clone(), version.clone());
        }

        // Register new tasks before wiring edges so they can refer to each other
        for (name, task) in &file.tasks {
            if build.tasks.get(name).is_some() {
                if task.run_tests.is_some() {
                    return Err(ConfigError::Invalid(format!(
                        "task '{}' already exists; run_tests only applies to new tasks",
                        name
                    ))
                    .into());
                }
                if let Some(description) = &task.description {
                    build.tasks.describe(name, description.clone())?;
                }
                continue;
            }
            match &task.run_tests {
                Some(source_set) => {
                    let description = task.description.as_deref().unwrap_or("Runs tests.");
                    build.add_test_task(name, source_set, description)?;
                }
                None => {
                    let mut custom = BuildTask::new(name.clone(), TaskAction::Aggregate);
                    if let Some(description) = &task.description {
                        custom = custom.with_description(description.clone());
                    }
                    build.tasks.register(custom)?;
                }
            }
        }

        for (name, task) in &file.tasks {
            for prerequisite in &task.depends_on {
                build.tasks.depends_on(name, prerequisite)?;
            }
            for other in &task.should_run_after {
                build.tasks.should_run_after(name, other)?;
            }
        }

        log::debug!("build definition for {} assembled", self.root.display());
        Ok(build)
    }
}
