//! Task dependency graph
//!
//! Tasks are connected by two kinds of edges:
//! - `DependsOn`: requesting the task pulls the prerequisite into the
//!   invocation, and a failed prerequisite blocks the task
//! - `ShouldRunAfter`: only orders two tasks that are both scheduled
//!
//! Both kinds share one graph so that cycles across them are caught at
//! declaration time. Execution is sequential in a topological order, with
//! ties broken by registration order.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Instant;

use super::error::{BuildError, GraphKind};
use super::graph::NamedGraph;
use super::report::{BuildReport, TaskOutcome};

/// Type of edge between tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Prerequisite must run and succeed first
    DependsOn,
    /// Ordering hint, applies only when both tasks are scheduled
    ShouldRunAfter,
}

/// What a task does when it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Compile a source set
    Compile { source_set: String },
    /// Run the tests of a source set
    RunTests { source_set: String },
    /// No action of its own; exists to group its prerequisites
    Aggregate,
}

impl TaskAction {
    pub fn label(&self) -> &'static str {
        match self {
            TaskAction::Compile { .. } => "compile",
            TaskAction::RunTests { .. } => "run-tests",
            TaskAction::Aggregate => "aggregate",
        }
    }

    /// Source set the action reads, if any
    pub fn source_set(&self) -> Option<&str> {
        match self {
            TaskAction::Compile { source_set } | TaskAction::RunTests { source_set } => {
                Some(source_set)
            }
            TaskAction::Aggregate => None,
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source_set() {
            Some(source_set) => write!(f, "{} {}", self.label(), source_set),
            None => write!(f, "{}", self.label()),
        }
    }
}

/// A named step of the build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTask {
    pub name: String,
    pub action: TaskAction,
    pub description: Option<String>,
    pub group: Option<String>,
}

impl BuildTask {
    pub fn new(name: impl Into<String>, action: TaskAction) -> Self {
        Self {
            name: name.into(),
            action,
            description: None,
            group: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Runs the action of a single task
///
/// Implemented for closures so callers can wrap their own execution engine.
pub trait TaskExecutor {
    fn execute(&mut self, task: &BuildTask) -> Result<(), BuildError>;
}

impl<F> TaskExecutor for F
where
    F: FnMut(&BuildTask) -> Result<(), BuildError>,
{
    fn execute(&mut self, task: &BuildTask) -> Result<(), BuildError> {
        self(task)
    }
}

/// The task graph of one build
#[derive(Debug)]
pub struct TaskGraph {
    graph: NamedGraph<EdgeKind>,
    tasks: HashMap<String, BuildTask>,
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGraph {
    pub fn new() -> Self {
        Self {
            graph: NamedGraph::new(GraphKind::Task),
            tasks: HashMap::new(),
        }
    }

    /// Registers a task
    pub fn register(&mut self, task: BuildTask) -> Result<(), BuildError> {
        if self.tasks.contains_key(&task.name) {
            return Err(BuildError::Duplicate {
                kind: GraphKind::Task,
                name: task.name,
            });
        }
        self.graph.add_node(&task.name);
        self.tasks.insert(task.name.clone(), task);
        Ok(())
    }

    /// Declares that `task` requires `prerequisite`
    ///
    /// Upgrades an existing ordering hint between the same tasks.
    pub fn depends_on(&mut self, task: &str, prerequisite: &str) -> Result<(), BuildError> {
        if let Some(kind) = self.graph.edge_weight_mut(task, prerequisite) {
            *kind = EdgeKind::DependsOn;
            return Ok(());
        }
        self.graph.add_edge(task, prerequisite, EdgeKind::DependsOn)
    }

    /// Declares that `task` should run after `other` when both are scheduled
    pub fn should_run_after(&mut self, task: &str, other: &str) -> Result<(), BuildError> {
        if self.graph.edge_weight_mut(task, other).is_some() {
            return Ok(());
        }
        self.graph.add_edge(task, other, EdgeKind::ShouldRunAfter)
    }

    pub fn get(&self, name: &str) -> Option<&BuildTask> {
        self.tasks.get(name)
    }

    /// Replaces the description of a registered task
    pub fn describe(&mut self, name: &str, description: impl Into<String>) -> Result<(), BuildError> {
        let task = self
            .tasks
            .get_mut(name)
            .ok_or_else(|| BuildError::TaskNotFound(name.to_string()))?;
        task.description = Some(description.into());
        Ok(())
    }

    /// Returns the number of registered tasks
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Returns tasks in registration order
    pub fn tasks(&self) -> impl Iterator<Item = &BuildTask> {
        self.graph.names().filter_map(move |n| self.tasks.get(n))
    }

    /// Returns the direct prerequisites of a task for the given edge kind
    pub fn prerequisites(&self, task: &str, kind: EdgeKind) -> Vec<&str> {
        self.graph
            .prerequisites(task)
            .into_iter()
            .filter(|(_, k)| **k == kind)
            .map(|(name, _)| name)
            .collect()
    }

    /// Returns the tasks an invocation of `targets` would run, in execution order
    pub fn plan(&self, targets: &[&str]) -> Result<Vec<String>, BuildError> {
        for target in targets {
            if !self.tasks.contains_key(*target) {
                return Err(BuildError::TaskNotFound(target.to_string()));
            }
        }

        // Everything reachable through hard edges
        let mut scheduled: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = targets.to_vec();
        while let Some(name) = stack.pop() {
            if scheduled.insert(name) {
                stack.extend(self.prerequisites(name, EdgeKind::DependsOn));
            }
        }

        // Kahn's algorithm over the scheduled subgraph, both edge kinds
        let registration: Vec<&str> = self.graph.names().collect();
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        for name in &scheduled {
            let degree = self
                .graph
                .prerequisites(name)
                .into_iter()
                .filter(|(prereq, _)| scheduled.contains(prereq))
                .count();
            in_degree.insert(name, degree);
        }

        let mut order: Vec<String> = Vec::with_capacity(scheduled.len());
        let mut done: HashSet<&str> = HashSet::new();
        while order.len() < scheduled.len() {
            let next = registration
                .iter()
                .copied()
                .find(|n| !done.contains(n) && in_degree.get(n) == Some(&0));

            let Some(next) = next else {
                // Unreachable while declarations stay acyclic
                let stuck = registration
                    .iter()
                    .find(|n| scheduled.contains(*n) && !done.contains(*n))
                    .copied()
                    .unwrap_or_default();
                return Err(BuildError::ConfigurationCycle {
                    kind: GraphKind::Task,
                    from: stuck.to_string(),
                    to: stuck.to_string(),
                });
            };

            done.insert(next);
            order.push(next.to_string());
            for (dependent, _) in self.graph.dependents(next) {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                }
            }
        }

        Ok(order)
    }

    /// Runs the targets and everything they depend on
    ///
    /// Each task runs at most once. A task whose hard prerequisite failed or
    /// was skipped is skipped; unrelated tasks still run. Errors returned
    /// directly are configuration errors raised before anything ran.
    pub fn run(&self, targets: &[&str], executor: &mut dyn TaskExecutor) -> Result<BuildReport, BuildError> {
        let order = self.plan(targets)?;
        log::info!("running {:?} as {:?}", targets, order);

        let mut report = BuildReport::new(targets.iter().map(|t| t.to_string()).collect());
        let mut outcomes: HashMap<&str, bool> = HashMap::new();

        for name in &order {
            let task = &self.tasks[name.as_str()];

            let blocked_by = self
                .prerequisites(name, EdgeKind::DependsOn)
                .into_iter()
                .find(|p| outcomes.get(p) != Some(&true));

            if let Some(blocked_by) = blocked_by {
                log::debug!("skipping {}: {} did not succeed", name, blocked_by);
                outcomes.insert(&task.name, false);
                report.record(
                    name,
                    TaskOutcome::Skipped {
                        blocked_by: blocked_by.to_string(),
                    },
                    0,
                );
                continue;
            }

            let started = Instant::now();
            let result = executor.execute(task);
            let elapsed = started.elapsed().as_millis() as i64;

            match result {
                Ok(()) => {
                    outcomes.insert(&task.name, true);
                    report.record(name, TaskOutcome::Succeeded, elapsed);
                }
                Err(e) => {
                    log::warn!("task {} failed: {}", name, e);
                    outcomes.insert(&task.name, false);
                    report.record(
                        name,
                        TaskOutcome::Failed {
                            message: e.to_string(),
                        },
                        elapsed,
                    );
                }
            }
        }

        report.finish();
        Ok(report)
    }
}
