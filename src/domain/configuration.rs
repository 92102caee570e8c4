//! Configuration inheritance graph
//!
//! Configurations are named buckets of declared dependencies. A child
//! configuration extends from zero or more parents and inherits all of
//! their entries. Resolution always walks the current declarations; nothing
//! is cached between requests.

use std::collections::{BTreeSet, HashMap};

use super::coordinate::{Dependency, DependencyCoordinate, Exclusion};
use super::error::{BuildError, GraphKind};
use super::graph::NamedGraph;

/// Exclusions attached to an extends-from edge
pub type EdgeExclusions = Vec<Exclusion>;

/// A named dependency bucket
#[derive(Debug, Clone)]
pub struct Configuration {
    pub name: String,
    dependencies: Vec<Dependency>,
}

impl Configuration {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dependencies: Vec::new(),
        }
    }

    /// Dependencies declared directly on this configuration
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }
}

/// The extends-from graph over configurations
#[derive(Debug)]
pub struct ConfigurationGraph {
    graph: NamedGraph<EdgeExclusions>,
    configurations: HashMap<String, Configuration>,
}

impl Default for ConfigurationGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationGraph {
    pub fn new() -> Self {
        Self {
            graph: NamedGraph::new(GraphKind::Configuration),
            configurations: HashMap::new(),
        }
    }

    /// Creates a configuration if it does not exist yet
    pub fn create(&mut self, name: &str) -> &mut Configuration {
        self.graph.add_node(name);
        self.configurations
            .entry(name.to_string())
            .or_insert_with(|| Configuration::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&Configuration> {
        self.configurations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.graph.contains(name)
    }

    /// Returns configuration names in creation order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graph.names()
    }

    /// Declares a dependency on a configuration
    pub fn declare(&mut self, name: &str, dependency: impl Into<Dependency>) -> Result<(), BuildError> {
        let config = self
            .configurations
            .get_mut(name)
            .ok_or_else(|| BuildError::UnknownConfiguration(name.to_string()))?;

        let dependency = dependency.into();
        log::debug!("declare {} on {}", dependency.coordinate, name);
        config.dependencies.push(dependency);
        Ok(())
    }

    /// Registers that `child` inherits every dependency of `parent`
    pub fn extends_from(&mut self, child: &str, parent: &str) -> Result<(), BuildError> {
        self.extends_from_excluding(child, parent, Vec::new())
    }

    /// Registers an extends-from edge that drops the excluded entries on the way down
    ///
    /// Re-declaring an existing edge merges the exclusions.
    pub fn extends_from_excluding(
        &mut self,
        child: &str,
        parent: &str,
        exclusions: EdgeExclusions,
    ) -> Result<(), BuildError> {
        if let Some(existing) = self.graph.edge_weight_mut(child, parent) {
            for exclusion in exclusions {
                if !existing.contains(&exclusion) {
                    existing.push(exclusion);
                }
            }
            return Ok(());
        }

        self.graph.add_edge(child, parent, exclusions)?;
        log::debug!("configuration {} extends from {}", child, parent);
        Ok(())
    }

    /// Returns the direct parents of a configuration, in declaration order
    pub fn parents(&self, name: &str) -> Vec<&str> {
        self.graph
            .prerequisites(name)
            .into_iter()
            .map(|(parent, _)| parent)
            .collect()
    }

    /// Computes the effective dependency set of a configuration
    ///
    /// The result is its own declared entries plus the effective sets of all
    /// parents, transitively. Exclusions declared on a dependency or on an
    /// edge apply to everything pulled in beneath the point they are declared.
    pub fn resolve(&self, name: &str) -> Result<BTreeSet<DependencyCoordinate>, BuildError> {
        if !self.contains(name) {
            return Err(BuildError::UnknownConfiguration(name.to_string()));
        }

        let mut resolved = BTreeSet::new();
        for dependency in self.resolve_dependencies(name) {
            resolved.insert(dependency.coordinate);
        }
        Ok(resolved)
    }

    /// Like [`resolve`](Self::resolve) but keeps each entry's accumulated
    /// exclusions and declaration order, for classpath construction
    pub fn resolve_dependencies(&self, name: &str) -> Vec<Dependency> {
        let mut out: Vec<Dependency> = Vec::new();
        self.collect(name, &[], &mut out);
        out
    }

    fn collect(&self, name: &str, inherited: &[Exclusion], out: &mut Vec<Dependency>) {
        let Some(config) = self.configurations.get(name) else {
            return;
        };

        for dependency in &config.dependencies {
            let excluded = inherited.iter().any(|e| e.matches(&dependency.coordinate));
            if excluded || out.iter().any(|d| d.coordinate == dependency.coordinate) {
                continue;
            }

            let mut entry = dependency.clone();
            for exclusion in inherited {
                if !entry.exclusions.contains(exclusion) {
                    entry.exclusions.push(exclusion.clone());
                }
            }
            out.push(entry);
        }

        // A dependency's own exclusions reach everything inherited beneath this configuration
        let mut scope = inherited.to_vec();
        for exclusion in config.dependencies.iter().flat_map(|d| d.exclusions.iter()) {
            if !scope.contains(exclusion) {
                scope.push(exclusion.clone());
            }
        }

        for (parent, edge_exclusions) in self.graph.prerequisites(name) {
            let mut parent_scope = scope.clone();
            parent_scope.extend(edge_exclusions.iter().cloned());
            self.collect(parent, &parent_scope, out);
        }
    }
}
