//! Static version feed
//!
//! Published versions are read from a TOML file instead of a remote
//! repository:
//!
//! ```toml
//! [modules]
//! "org.springdoc:springdoc-openapi-starter-webmvc-ui" = [
//!     "2.3.0",
//!     { version = "2.6.0-RC1", channel = "release-candidate" },
//! ]
//! ```
//!
//! Plain strings are published on the `current` channel.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::config::ConfigError;
use crate::domain::{AvailableVersion, VersionFeed};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedEntry {
    Plain(String),
    Detailed(AvailableVersion),
}

impl From<FeedEntry> for AvailableVersion {
    fn from(entry: FeedEntry) -> Self {
        match entry {
            FeedEntry::Plain(version) => AvailableVersion::current(version),
            FeedEntry::Detailed(version) => version,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FeedFile {
    #[serde(default)]
    modules: BTreeMap<String, Vec<FeedEntry>>,
}

/// Version feed backed by a file on disk
#[derive(Debug, Default, Clone)]
pub struct StaticVersionFeed {
    modules: BTreeMap<String, Vec<AvailableVersion>>,
}

impl StaticVersionFeed {
    /// Parses a feed from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let file: FeedFile = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse version feed")?;

        let modules = file
            .modules
            .into_iter()
            .map(|(module, entries)| (module, entries.into_iter().map(Into::into).collect()))
            .collect();

        Ok(Self { modules })
    }

    /// Loads a feed file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read version feed: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Returns the number of modules in the feed
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if the feed lists no modules
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl VersionFeed for StaticVersionFeed {
    fn versions(&self, group: &str, artifact: &str) -> Vec<AvailableVersion> {
        self.modules
            .get(&format!("{}:{}", group, artifact))
            .cloned()
            .unwrap_or_default()
    }
}
