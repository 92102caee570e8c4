//! Dependency update scanning
//!
//! Looks up newer versions of declared dependencies in a [`VersionFeed`],
//! keeps only the configured release channel, and rejects anything the
//! stability classifier considers a pre-release.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::coordinate::{compare_versions, DependencyCoordinate};
use super::stability::is_stable;

/// Release channel a published version belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseChannel {
    #[default]
    Current,
    #[serde(alias = "preview")]
    ReleaseCandidate,
    Nightly,
}

impl ReleaseChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseChannel::Current => "current",
            ReleaseChannel::ReleaseCandidate => "release-candidate",
            ReleaseChannel::Nightly => "nightly",
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" => Ok(ReleaseChannel::Current),
            "release-candidate" | "preview" => Ok(ReleaseChannel::ReleaseCandidate),
            "nightly" => Ok(ReleaseChannel::Nightly),
            other => Err(format!("Unknown release channel: {}", other)),
        }
    }
}

/// A version published by an external feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableVersion {
    pub version: String,
    #[serde(default)]
    pub channel: ReleaseChannel,
}

impl AvailableVersion {
    pub fn current(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            channel: ReleaseChannel::Current,
        }
    }
}

/// Source of published versions for a module
pub trait VersionFeed {
    /// Returns every published version of `group:artifact`; empty if unknown
    fn versions(&self, group: &str, artifact: &str) -> Vec<AvailableVersion>;
}

/// A newer version of an already declared dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyCandidate {
    pub group: String,
    pub artifact: String,
    pub current: String,
    pub candidate: String,
}

impl fmt::Display for DependencyCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} [{} -> {}]", self.group, self.artifact, self.current, self.candidate)
    }
}

/// A newer version that was filtered out as unstable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedVersion {
    pub module: String,
    pub version: String,
}

/// Everything a scan found
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateReport {
    pub candidates: Vec<DependencyCandidate>,
    pub rejected: Vec<RejectedVersion>,
    pub up_to_date: Vec<String>,
    /// Declared without a resolvable version, so not compared
    pub unversioned: Vec<String>,
}

/// Filters feed versions into upgrade candidates
#[derive(Debug, Clone, Default)]
pub struct UpdateScanner {
    channel: ReleaseChannel,
}

impl UpdateScanner {
    pub fn new(channel: ReleaseChannel) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> ReleaseChannel {
        self.channel
    }

    /// Returns the newest stable candidate for each declared dependency
    pub fn scan_candidates<'a>(
        &self,
        declared: impl IntoIterator<Item = &'a DependencyCoordinate>,
        feed: &dyn VersionFeed,
    ) -> Vec<DependencyCandidate> {
        self.scan(declared, feed).candidates
    }

    /// Scans declared dependencies and reports candidates and rejections
    ///
    /// Each `group:artifact` is scanned once, using the first declaration seen.
    pub fn scan<'a>(
        &self,
        declared: impl IntoIterator<Item = &'a DependencyCoordinate>,
        feed: &dyn VersionFeed,
    ) -> UpdateReport {
        let mut report = UpdateReport::default();
        let mut seen: HashSet<String> = HashSet::new();

        for coordinate in declared {
            let module = coordinate.module_key();
            if !seen.insert(module.clone()) {
                continue;
            }

            let Some(current) = coordinate.version.as_deref() else {
                report.unversioned.push(module);
                continue;
            };

            let newer: Vec<String> = feed
                .versions(&coordinate.group, &coordinate.artifact)
                .into_iter()
                // Other channels never reach the stability filter
                .filter(|v| v.channel == self.channel)
                .map(|v| v.version)
                .filter(|v| compare_versions(v, current) == Ordering::Greater)
                .collect();

            let mut best: Option<String> = None;
            for version in newer {
                if !is_stable(&version) {
                    log::debug!("rejecting {}:{} as unstable", module, version);
                    report.rejected.push(RejectedVersion {
                        module: module.clone(),
                        version,
                    });
                    continue;
                }
                let is_better = best
                    .as_deref()
                    .map(|b| compare_versions(&version, b) == Ordering::Greater)
                    .unwrap_or(true);
                if is_better {
                    best = Some(version);
                }
            }

            match best {
                Some(candidate) => report.candidates.push(DependencyCandidate {
                    group: coordinate.group.clone(),
                    artifact: coordinate.artifact.clone(),
                    current: current.to_string(),
                    candidate,
                }),
                None => report.up_to_date.push(coordinate.to_string()),
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapFeed(HashMap<String, Vec<AvailableVersion>>);

    impl MapFeed {
        fn with(mut self, module: &str, versions: &[(&str, ReleaseChannel)]) -> Self {
            self.0.insert(
                module.to_string(),
                versions
                    .iter()
                    .map(|(v, c)| AvailableVersion {
                        version: v.to_string(),
                        channel: *c,
                    })
                    .collect(),
            );
            self
        }
    }

    impl VersionFeed for MapFeed {
        fn versions(&self, group: &str, artifact: &str) -> Vec<AvailableVersion> {
            self.0
                .get(&format!("{}:{}", group, artifact))
                .cloned()
                .unwrap_or_default()
        }
    }

    fn coord(s: &str) -> DependencyCoordinate {
        s.parse().unwrap()
    }

    use ReleaseChannel::*;

    #[test]
    fn picks_newest_stable_candidate() {
        let feed = MapFeed::default().with(
            "org.springdoc:springdoc-openapi-starter-webmvc-ui",
            &[
                ("2.1.0", Current),
                ("2.2.0", Current),
                ("2.3.0", Current),
                ("2.5.0", Current),
                ("2.6.0-RC1", Current),
            ],
        );
        let declared = [coord("org.springdoc:springdoc-openapi-starter-webmvc-ui:2.2.0")];

        let candidates = UpdateScanner::default().scan_candidates(&declared, &feed);

        assert_eq!(
            candidates,
            vec![DependencyCandidate {
                group: "org.springdoc".to_string(),
                artifact: "springdoc-openapi-starter-webmvc-ui".to_string(),
                current: "2.2.0".to_string(),
                candidate: "2.5.0".to_string(),
            }]
        );
    }

    #[test]
    fn unstable_newer_versions_are_rejected() {
        let feed = MapFeed::default().with("g:a", &[("1.1-rc1", Current), ("2.0.0-M1", Current)]);
        let declared = [coord("g:a:1.0")];

        let report = UpdateScanner::default().scan(&declared, &feed);

        assert!(report.candidates.is_empty());
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.up_to_date, vec!["g:a:1.0"]);
    }

    #[test]
    fn keyword_versions_are_candidates() {
        let feed = MapFeed::default().with("g:a", &[("1.1-alpha-RELEASE", Current)]);
        let candidates = UpdateScanner::default().scan_candidates(&[coord("g:a:1.0")], &feed);
        assert_eq!(candidates[0].candidate, "1.1-alpha-RELEASE");
    }

    #[test]
    fn other_channels_excluded_before_stability() {
        // Stable-looking versions on other channels are never considered
        let feed = MapFeed::default().with(
            "g:a",
            &[("3.0.0", Nightly), ("2.0.0", ReleaseCandidate), ("1.5.0", Current)],
        );
        let report = UpdateScanner::new(Current).scan(&[coord("g:a:1.0")], &feed);

        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].candidate, "1.5.0");
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn release_supersedes_its_release_candidate() {
        let feed = MapFeed::default().with(
            "g:a",
            &[("2.6.0-RC1", Current), ("2.6.0-RC2", Current), ("2.6.0", Current)],
        );
        let report = UpdateScanner::default().scan(&[coord("g:a:2.6.0-RC1")], &feed);

        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].candidate, "2.6.0");
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].version, "2.6.0-RC2");
    }

    #[test]
    fn release_is_not_offered_its_own_release_candidate() {
        let feed = MapFeed::default().with("g:a", &[("2.6.0-RC1", Current)]);
        let report = UpdateScanner::default().scan(&[coord("g:a:2.6.0")], &feed);
        assert!(report.candidates.is_empty());
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn older_versions_ignored() {
        let feed = MapFeed::default().with("g:a", &[("0.9", Current), ("1.0", Current)]);
        let report = UpdateScanner::default().scan(&[coord("g:a:1.0")], &feed);
        assert!(report.candidates.is_empty());
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn duplicates_and_unversioned() {
        let feed = MapFeed::default().with("g:a", &[("2.0", Current)]);
        let declared = [coord("g:a:1.0"), coord("g:a:1.0"), coord("g:managed")];

        let report = UpdateScanner::default().scan(&declared, &feed);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.unversioned, vec!["g:managed"]);
    }

    #[test]
    fn channel_parsing() {
        assert_eq!("current".parse::<ReleaseChannel>(), Ok(Current));
        assert_eq!("preview".parse::<ReleaseChannel>(), Ok(ReleaseCandidate));
        assert_eq!("Nightly".parse::<ReleaseChannel>(), Ok(Nightly));
        assert!("weekly".parse::<ReleaseChannel>().is_err());
    }
}
