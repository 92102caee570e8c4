//! Configuration handling for buildplan
//!
//! The build is described by `build.toml` at the project root. User
//! preferences live in `~/.config/buildplan/config.toml` (global).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Dependency, DependencyCoordinate, Exclusion, ReleaseChannel};

pub const BUILD_FILE: &str = "build.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Toolchain pin handed to the external compiler
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Java language version, opaque to the build model
    pub java_version: Option<String>,
}

/// An extra source set, or extra directories for a standard one
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SourceSetConfig {
    pub name: String,
    pub dirs: Vec<PathBuf>,
    pub extends: Vec<String>,
}

/// A dependency entry: `"group:artifact[:version]"` or a table with exclusions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DependencySpec {
    Coordinate(DependencyCoordinate),
    Detailed {
        coordinate: DependencyCoordinate,
        #[serde(default)]
        exclude: Vec<Exclusion>,
    },
}

impl DependencySpec {
    pub fn to_dependency(&self) -> Dependency {
        match self {
            DependencySpec::Coordinate(coordinate) => Dependency::new(coordinate.clone()),
            DependencySpec::Detailed { coordinate, exclude } => exclude
                .iter()
                .cloned()
                .fold(Dependency::new(coordinate.clone()), Dependency::excluding),
        }
    }
}

/// Per-task settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TaskConfig {
    /// Shell command performing the task's action
    pub command: Option<String>,

    /// Registers a new test task over the named source set
    pub run_tests: Option<String>,

    pub description: Option<String>,
    pub depends_on: Vec<String>,
    pub should_run_after: Vec<String>,
}

/// Dependency update settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct UpdatesConfig {
    /// Only versions published on this channel are considered
    pub channel: ReleaseChannel,

    /// Version feed file, relative to the project root
    pub feed: Option<PathBuf>,
}

/// Contents of `build.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuildFile {
    /// Project name
    pub name: Option<String>,

    /// Plugin identifiers, passed through untouched
    pub plugins: Vec<String>,

    /// Repository names, passed through untouched
    pub repositories: Vec<String>,

    /// Output root for compiled classes
    pub build_dir: PathBuf,

    pub toolchain: ToolchainConfig,

    #[serde(rename = "source_set")]
    pub source_sets: Vec<SourceSetConfig>,

    /// Configuration name -> declared dependencies
    pub dependencies: BTreeMap<String, Vec<DependencySpec>>,

    /// Extra extends-from edges: configuration -> parents
    pub configurations: BTreeMap<String, Vec<String>>,

    /// `group:artifact` -> version, for declarations without a version
    pub managed_versions: BTreeMap<String, String>,

    pub updates: UpdatesConfig,

    /// Formatter settings, passed through untouched
    pub formatter: Option<toml::Table>,

    pub tasks: BTreeMap<String, TaskConfig>,
}

impl Default for BuildFile {
    fn default() -> Self {
        Self {
            name: None,
            plugins: vec![],
            repositories: vec![],
            build_dir: PathBuf::from("build"),
            toolchain: ToolchainConfig::default(),
            source_sets: vec![],
            dependencies: BTreeMap::new(),
            configurations: BTreeMap::new(),
            managed_versions: BTreeMap::new(),
            updates: UpdatesConfig::default(),
            formatter: None,
            tasks: BTreeMap::new(),
        }
    }
}

impl BuildFile {
    /// Parses a build file from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let file: BuildFile = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse build file")?;
        file.validate()?;
        Ok(file)
    }

    /// Loads `build.toml` from a project root
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(BUILD_FILE);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read build file: {}", path.display()))?;
        Self::parse(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for source_set in &self.source_sets {
            if source_set.name.trim().is_empty() {
                return Err(ConfigError::Invalid("source_set entry without a name".to_string()));
            }
        }
        for module in self.managed_versions.keys() {
            if module.split(':').count() != 2 {
                return Err(ConfigError::Invalid(format!(
                    "managed version key must be 'group:artifact', got '{}'",
                    module
                )));
            }
        }
        Ok(())
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

impl GlobalConfig {
    /// Returns the global config directory
    pub fn dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "buildplan", "buildplan").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_dir = match Self::dir() {
            Some(dir) => dir,
            None => return Ok(Self::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }
}

/// Finds the project root by looking for `build.toml` in `start` or a parent
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(BUILD_FILE).is_file() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}
