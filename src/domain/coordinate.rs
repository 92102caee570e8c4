//! Dependency coordinates
//!
//! Format:
//! - Versioned: `{group}:{artifact}:{version}` (e.g., `org.springdoc:springdoc-openapi-starter-webmvc-ui:2.2.0`)
//! - Managed: `{group}:{artifact}` (version supplied by a platform pin)
//!
//! Exclusions name a group and optionally a module within it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Malformed coordinate: expected 'group:artifact[:version]', got '{0}'")]
    Malformed(String),

    #[error("Malformed exclusion: expected 'group[:module]', got '{0}'")]
    MalformedExclusion(String),
}

/// A `group:artifact[:version]` tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DependencyCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
}

impl DependencyCoordinate {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: Some(version.into()),
        }
    }

    /// Creates a coordinate whose version is supplied by a platform pin
    pub fn managed(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: None,
        }
    }

    /// Returns the `group:artifact` key, ignoring the version
    pub fn module_key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    /// Returns a copy carrying the given version
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            version: Some(version.into()),
        }
    }

    pub fn is_managed(&self) -> bool {
        self.version.is_none()
    }
}

impl fmt::Display for DependencyCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}:{}", self.group, self.artifact, v),
            None => write!(f, "{}:{}", self.group, self.artifact),
        }
    }
}

impl FromStr for DependencyCoordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parts: Vec<&str> = s.split(':').collect();

        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(CoordinateError::Malformed(s.to_string()));
        }

        match parts.as_slice() {
            [group, artifact] => Ok(Self::managed(*group, *artifact)),
            [group, artifact, version] => Ok(Self::new(*group, *artifact, *version)),
            _ => Err(CoordinateError::Malformed(s.to_string())),
        }
    }
}

impl TryFrom<String> for DependencyCoordinate {
    type Error = CoordinateError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DependencyCoordinate> for String {
    fn from(c: DependencyCoordinate) -> Self {
        c.to_string()
    }
}

/// Excludes a whole group or a single module from resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exclusion {
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

impl Exclusion {
    pub fn group(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            module: None,
        }
    }

    pub fn module(group: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            module: Some(module.into()),
        }
    }

    /// Returns true if this exclusion removes the coordinate
    pub fn matches(&self, coordinate: &DependencyCoordinate) -> bool {
        if self.group != coordinate.group {
            return false;
        }
        match &self.module {
            Some(module) => module == &coordinate.artifact,
            None => true,
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(m) => write!(f, "{}:{}", self.group, m),
            None => write!(f, "{}", self.group),
        }
    }
}

impl FromStr for Exclusion {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split(':').collect::<Vec<_>>().as_slice() {
            [group] if !group.is_empty() => Ok(Self::group(*group)),
            [group, module] if !group.is_empty() && !module.is_empty() => {
                Ok(Self::module(*group, *module))
            }
            _ => Err(CoordinateError::MalformedExclusion(s.to_string())),
        }
    }
}

/// A declared dependency: a coordinate plus the exclusions applied to
/// everything it brings in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub coordinate: DependencyCoordinate,
    pub exclusions: Vec<Exclusion>,
}

impl Dependency {
    pub fn new(coordinate: DependencyCoordinate) -> Self {
        Self {
            coordinate,
            exclusions: Vec::new(),
        }
    }

    pub fn excluding(mut self, exclusion: Exclusion) -> Self {
        if !self.exclusions.contains(&exclusion) {
            self.exclusions.push(exclusion);
        }
        self
    }

    /// Returns true if any of this dependency's exclusions removes the coordinate
    pub fn excludes(&self, coordinate: &DependencyCoordinate) -> bool {
        self.exclusions.iter().any(|e| e.matches(coordinate))
    }
}

impl From<DependencyCoordinate> for Dependency {
    fn from(coordinate: DependencyCoordinate) -> Self {
        Self::new(coordinate)
    }
}

/// Compares two version strings segment by segment.
///
/// Splits on `.` and `-`; numeric segments compare numerically, others
/// lexicographically. A qualifier sorts below a number and below a missing
/// segment, so `2.6.0-RC1 < 2.6.0 < 2.6.0.1`. A missing segment counts as `0`
/// against a number.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = split_version(a);
    let b_parts = split_version(b);

    let max_len = a_parts.len().max(b_parts.len());
    for i in 0..max_len {
        let ord = compare_segments(a_parts.get(i).copied(), b_parts.get(i).copied());
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

fn compare_segments(a: Option<&str>, b: Option<&str>) -> Ordering {
    let a_num = a.map(str::parse::<u64>);
    let b_num = b.map(str::parse::<u64>);

    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => match a_num {
            Some(Ok(n)) => n.cmp(&0),
            _ => Ordering::Less,
        },
        (None, Some(_)) => match b_num {
            Some(Ok(n)) => 0.cmp(&n),
            _ => Ordering::Greater,
        },
        (Some(ap), Some(bp)) => match (a_num, b_num) {
            (Some(Ok(an)), Some(Ok(bn))) => an.cmp(&bn),
            (Some(Ok(_)), _) => Ordering::Greater,
            (_, Some(Ok(_))) => Ordering::Less,
            _ => ap.cmp(bp),
        },
    }
}

fn split_version(v: &str) -> Vec<&str> {
    v.split(['.', '-']).filter(|s| !s.is_empty()).collect()
}
