//! # Storage Layer
//!
//! Reads the project's build description and version feed from disk.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Build definition | TOML | `build.toml` |
//! | Version feed | TOML | `versions.toml` (set by `[updates] feed`) |
//! | User preferences | TOML | `~/.config/buildplan/config.toml` |
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a buildplan project
//! - [`BuildFile`] - Parsed `build.toml`
//! - [`StaticVersionFeed`] - Published versions for update scans
//! - [`GlobalConfig`] - User-level preferences

mod config;
mod feed;
mod project;

pub use config::{
    find_project_root, BuildFile, ConfigError, DependencySpec, GlobalConfig, OutputFormat,
    SourceSetConfig, TaskConfig, ToolchainConfig, UpdatesConfig, BUILD_FILE,
};
pub use feed::StaticVersionFeed;
pub use project::{Project, ProjectError};
