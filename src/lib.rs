//! buildplan - build orchestration for Java web-service projects
//!
//! A project declares source sets (`main`, `test`, `functionalTest`),
//! dependency configurations that inherit from each other, and tasks with
//! ordering constraints. buildplan resolves classpaths, runs tasks in
//! dependency order through external commands, and reports dependency
//! upgrades that are stable releases.

pub mod cli;
pub mod domain;
pub mod engine;
pub mod storage;

pub use domain::{BuildDefinition, BuildError, BuildReport, DependencyCoordinate, TaskOutcome};
