//! Named directed graph with cycle detection
//!
//! Shared backing store for the configuration, source set and task graphs.
//! Nodes are addressed by name; an edge `prerequisite -> dependent` means
//! the prerequisite is consumed (or runs) before the dependent.
//! Uses petgraph for graph operations.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use super::error::{BuildError, GraphKind};

/// A directed graph over named nodes that stays acyclic
#[derive(Debug)]
pub struct NamedGraph<E> {
    kind: GraphKind,

    /// The underlying directed graph
    graph: DiGraph<String, E>,

    /// Map from node name to node index
    node_map: HashMap<String, NodeIndex>,
}

impl<E> NamedGraph<E> {
    /// Creates an empty graph for the given kind of node
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Adds a node, returning false if it already existed
    pub fn add_node(&mut self, name: &str) -> bool {
        if self.node_map.contains_key(name) {
            return false;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_map.insert(name.to_string(), idx);
        true
    }

    /// Returns true if the graph contains the node
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Returns node names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(move |idx| self.graph[idx].as_str())
    }

    /// Returns the number of nodes in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    fn index(&self, name: &str) -> Result<NodeIndex, BuildError> {
        self.node_map
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::not_found(self.kind, name))
    }

    /// Adds an edge: `dependent` consumes or runs after `prerequisite`
    ///
    /// The edge direction is: prerequisite -> dependent.
    /// Fails without modifying the graph if the edge would close a cycle.
    pub fn add_edge(&mut self, dependent: &str, prerequisite: &str, weight: E) -> Result<(), BuildError> {
        if dependent == prerequisite {
            return Err(BuildError::SelfDependency {
                kind: self.kind,
                name: dependent.to_string(),
            });
        }

        let dependent_idx = self.index(dependent)?;
        let prerequisite_idx = self.index(prerequisite)?;

        let edge = self.graph.add_edge(prerequisite_idx, dependent_idx, weight);

        if is_cyclic_directed(&self.graph) {
            // Remove the edge we just added
            self.graph.remove_edge(edge);
            return Err(BuildError::ConfigurationCycle {
                kind: self.kind,
                from: dependent.to_string(),
                to: prerequisite.to_string(),
            });
        }

        Ok(())
    }

    /// Returns the weight of an existing edge for in-place updates
    pub fn edge_weight_mut(&mut self, dependent: &str, prerequisite: &str) -> Option<&mut E> {
        let dependent_idx = *self.node_map.get(dependent)?;
        let prerequisite_idx = *self.node_map.get(prerequisite)?;
        let edge = self.graph.find_edge(prerequisite_idx, dependent_idx)?;
        self.graph.edge_weight_mut(edge)
    }

    /// Returns the prerequisites of a node with their edge weights, in
    /// the order the edges were added
    pub fn prerequisites(&self, name: &str) -> Vec<(&str, &E)> {
        self.neighbors(name, Direction::Incoming)
    }

    /// Returns the dependents of a node with their edge weights, in the
    /// order the edges were added
    pub fn dependents(&self, name: &str) -> Vec<(&str, &E)> {
        self.neighbors(name, Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<(&str, &E)> {
        let idx = match self.node_map.get(name) {
            Some(idx) => *idx,
            None => return vec![],
        };

        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|e| e.id());

        edges
            .into_iter()
            .map(|e| {
                let other = match direction {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                };
                (self.graph[other].as_str(), e.weight())
            })
            .collect()
    }
}
