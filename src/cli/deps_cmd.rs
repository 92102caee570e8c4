//! Dependency commands (classpath, resolve, dependency-updates, stable)

use std::path::PathBuf;

use anyhow::{bail, Result};

use super::output::Output;
use crate::domain::{is_stable, ReleaseChannel, UpdateScanner};
use crate::storage::{Project, StaticVersionFeed};

/// Prints the compile or runtime classpath of a source set
pub fn classpath(output: &Output, source_set: &str, runtime: bool) -> Result<()> {
    let project = Project::open_current()?;
    let build = project.definition()?;

    let entries = if runtime {
        build.runtime_classpath(source_set)?
    } else {
        build.compile_classpath(source_set)?
    };
    output.verbose_ctx(
        "classpath",
        &format!("{} entries for {} (runtime={})", entries.len(), source_set, runtime),
    );

    if output.is_json() {
        output.data(&entries);
    } else {
        for entry in &entries {
            println!("{}", entry);
        }
    }

    Ok(())
}

/// Prints the resolved artifacts of a configuration
pub fn resolve(output: &Output, configuration: &str) -> Result<()> {
    let project = Project::open_current()?;
    let build = project.definition()?;

    let artifacts = build.resolve_artifacts(configuration)?;
    output.verbose_ctx(
        "resolve",
        &format!(
            "{} extends from {:?}",
            configuration,
            build.configurations.parents(configuration)
        ),
    );

    if output.is_json() {
        let items: Vec<String> = artifacts.iter().map(|a| a.to_string()).collect();
        output.data(&items);
    } else if artifacts.is_empty() {
        println!("No dependencies in {}", configuration);
    } else {
        for artifact in &artifacts {
            println!("{}", artifact);
        }
    }

    Ok(())
}

/// Reports newer stable versions of declared dependencies
pub fn updates(
    output: &Output,
    channel: Option<ReleaseChannel>,
    feed: Option<PathBuf>,
) -> Result<()> {
    let project = Project::open_current()?;
    let build = project.definition()?;

    let feed = match feed {
        Some(path) => StaticVersionFeed::load(&path)?,
        None => project.version_feed()?,
    };
    let scanner = UpdateScanner::new(channel.unwrap_or(project.build_file().updates.channel));
    output.verbose_ctx(
        "updates",
        &format!("channel {}, {} modules in feed", scanner.channel(), feed.len()),
    );

    let declared = build.declared_coordinates();
    let report = scanner.scan(&declared, &feed);

    if output.is_json() {
        output.data(&report);
        return Ok(());
    }

    if report.candidates.is_empty() {
        println!("All dependencies are using the latest {} versions.", scanner.channel());
    } else {
        output.list(
            &format!("The following dependencies have later {} versions:", scanner.channel()),
            &report.candidates,
        );
    }

    if output.is_verbose() {
        if !report.up_to_date.is_empty() {
            output.blank();
            output.list("Up to date:", &report.up_to_date);
        }
        if !report.rejected.is_empty() {
            output.blank();
            output.list(
                "Rejected as unstable:",
                report.rejected.iter().map(|r| format!("{}:{}", r.module, r.version)),
            );
        }
    }

    if !report.unversioned.is_empty() {
        output.blank();
        output.list("Dependencies without a resolvable version:", &report.unversioned);
    }

    Ok(())
}

/// Classifies version strings; fails if any of them is unstable
pub fn stable(output: &Output, versions: &[String]) -> Result<()> {
    let results: Vec<(&str, bool)> = versions
        .iter()
        .map(|v| (v.as_str(), is_stable(v)))
        .collect();

    if output.is_json() {
        let items: Vec<_> = results
            .iter()
            .map(|(version, stable)| serde_json::json!({ "version": version, "stable": stable }))
            .collect();
        output.data(&items);
    } else {
        for (version, stable) in &results {
            output.row(&[*version, if *stable { "stable" } else { "unstable" }]);
        }
    }

    let unstable = results.iter().filter(|(_, stable)| !stable).count();
    if unstable > 0 {
        bail!("{} of {} versions are unstable", unstable, results.len());
    }
    Ok(())
}
