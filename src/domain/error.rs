//! Errors raised while declaring or resolving the build model

use std::fmt;
use thiserror::Error;

use super::coordinate::CoordinateError;

/// Which declaration graph an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Configuration,
    SourceSet,
    Task,
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphKind::Configuration => write!(f, "configuration"),
            GraphKind::SourceSet => write!(f, "source set"),
            GraphKind::Task => write!(f, "task"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Adding {kind} edge would create a cycle: {from} -> {to}")]
    ConfigurationCycle {
        kind: GraphKind,
        from: String,
        to: String,
    },

    #[error("A {kind} cannot depend on itself: {name}")]
    SelfDependency { kind: GraphKind, name: String },

    #[error("Configuration not found: {0}")]
    UnknownConfiguration(String),

    #[error("Source set not found: {0}")]
    UnknownSourceSet(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Duplicate {kind}: {name}")]
    Duplicate { kind: GraphKind, name: String },

    #[error("Could not resolve {coordinate} (required by configuration '{configuration}')")]
    UnresolvedDependency {
        coordinate: String,
        configuration: String,
    },

    #[error("Task '{task}' failed: {message}")]
    TaskExecutionFailure { task: String, message: String },

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

impl BuildError {
    /// Returns the error for a missing node of the given graph kind
    pub fn not_found(kind: GraphKind, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            GraphKind::Configuration => BuildError::UnknownConfiguration(name),
            GraphKind::SourceSet => BuildError::UnknownSourceSet(name),
            GraphKind::Task => BuildError::TaskNotFound(name),
        }
    }

    /// Returns true for errors that must abort the invocation before any task runs
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            BuildError::UnresolvedDependency { .. } | BuildError::TaskExecutionFailure { .. }
        )
    }
}
