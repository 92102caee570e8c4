//! # Task Execution
//!
//! [`ActionRunner`](crate::domain::ActionRunner) implementations that hand
//! task actions to the outside world.
//!
//! - [`ProcessRunner`] - Runs the shell command configured for each task
//! - [`DryRunRunner`] - Records what would run without running anything
//!
//! Commands receive the task context through environment variables:
//!
//! | Variable | Value |
//! |----------|-------|
//! | `BUILDPLAN_TASK` | Task name |
//! | `BUILDPLAN_ACTION` | `compile`, `run-tests` or `aggregate` |
//! | `BUILDPLAN_CLASSPATH` | Classpath entries joined with `:` |
//! | `BUILDPLAN_SOURCE_DIRS` | Source directories joined with `:` |
//! | `BUILDPLAN_OUTPUT_DIR` | Output directory of the source set |
//! | `BUILDPLAN_JAVA_VERSION` | Toolchain pin from `build.toml` |

mod process;

pub use process::{DryRunRunner, PlannedStep, ProcessRunner};
