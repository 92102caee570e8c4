//! Terminal and JSON rendering for build commands
//!
//! Commands print their payload to stdout. Task failures, verbose traces and
//! anything else meant for a human watching the build go to stderr, so
//! `--format json` output can be piped straight into `jq`.

use serde::Serialize;

use crate::domain::{TaskOutcome, TaskResult};
use crate::storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Prints a one-off status line, wrapped as `{"message": ..}` in JSON mode
    pub fn message(&self, message: &str) {
        if self.is_json() {
            println!("{}", serde_json::json!({ "message": message }));
        } else {
            println!("{}", message);
        }
    }

    /// Prints a serializable payload as compact JSON
    ///
    /// Text callers normally render their own layout; this pretty-prints as a
    /// fallback.
    pub fn data<T: Serialize>(&self, data: &T) {
        let rendered = if self.is_json() {
            serde_json::to_string(data)
        } else {
            serde_json::to_string_pretty(data)
        };
        match rendered {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("failed to serialize output: {}", e),
        }
    }

    /// Prints one line per task result, with failure details indented on stderr
    pub fn task_result(&self, result: &TaskResult) {
        if self.is_json() {
            return;
        }
        println!("{}", task_line(result));
        if let TaskOutcome::Failed { message } = &result.outcome {
            for line in message.lines() {
                eprintln!("    {}", line);
            }
        }
    }

    /// Prints a heading followed by ` - item` lines; nothing when empty
    pub fn list<I, T>(&self, heading: &str, items: I)
    where
        I: IntoIterator<Item = T>,
        T: std::fmt::Display,
    {
        if self.is_json() {
            return;
        }
        let mut items = items.into_iter().peekable();
        if items.peek().is_none() {
            return;
        }
        println!("{}", heading);
        for item in items {
            println!(" - {}", item);
        }
    }

    /// Prints left-aligned columns (text only)
    pub fn row(&self, columns: &[&str]) {
        if !self.is_json() {
            println!("{}", pad_columns(columns));
        }
    }

    pub fn blank(&self) {
        if !self.is_json() {
            println!();
        }
    }

    /// Prints a `--verbose` trace tagged with the command it came from
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[{}] {}", context, message);
        }
    }
}

fn task_line(result: &TaskResult) -> String {
    let label = result.outcome.label();
    match &result.outcome {
        TaskOutcome::Succeeded => format!("{:<8} {} ({} ms)", label, result.task, result.duration_ms),
        TaskOutcome::Failed { .. } => format!("{:<8} {}", label, result.task),
        TaskOutcome::Skipped { blocked_by } => {
            format!("{:<8} {} (blocked by {})", label, result.task, blocked_by)
        }
    }
}

fn pad_columns(columns: &[&str]) -> String {
    match columns.split_last() {
        Some((last, rest)) => {
            let mut line: String = rest.iter().map(|c| format!("{:<14} ", c)).collect();
            line.push_str(last);
            line
        }
        None => String::new(),
    }
}
