//! Domain models for buildplan
//!
//! Contains the build model without any I/O concerns.

mod build;
mod configuration;
mod coordinate;
mod error;
mod graph;
mod report;
mod source_set;
mod stability;
mod task_graph;
mod updates;

pub use build::{
    ActionRunner, BuildDefinition, TaskInvocation, CHECK, FUNCTIONAL_TEST_TASK, TEST_TASK,
    VERIFICATION_GROUP,
};
pub use configuration::{Configuration, ConfigurationGraph};
pub use coordinate::{compare_versions, CoordinateError, Dependency, DependencyCoordinate, Exclusion};
pub use error::{BuildError, GraphKind};
pub use report::{BuildReport, TaskOutcome, TaskResult};
pub use source_set::{ClasspathEntry, SourceSet, SourceSetRegistry, FUNCTIONAL_TEST, MAIN, TEST};
pub use stability::{is_non_stable, is_stable};
pub use task_graph::{BuildTask, EdgeKind, TaskAction, TaskExecutor, TaskGraph};
pub use updates::{
    AvailableVersion, DependencyCandidate, ReleaseChannel, RejectedVersion, UpdateReport,
    UpdateScanner, VersionFeed,
};
