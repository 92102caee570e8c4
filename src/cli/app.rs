//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use super::build_cmd::{self, Target};
use super::deps_cmd;
use super::output::{Output, OutputFormat};
use crate::domain::ReleaseChannel;
use crate::storage::{GlobalConfig, Project};

#[derive(Parser)]
#[command(name = "buildplan")]
#[command(author, version, about = "Build orchestration for Java web services")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true, env = "BUILDPLAN_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new project with the standard layout
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Compile every source set
    Compile(ExecArgs),

    /// Run the unit tests
    Test(ExecArgs),

    /// Run the functional tests
    FunctionalTest(ExecArgs),

    /// Run all verification tasks
    Check(ExecArgs),

    /// Run tasks by name
    Run {
        #[arg(required = true)]
        tasks: Vec<String>,

        #[command(flatten)]
        exec: ExecArgs,
    },

    /// List registered tasks
    Tasks,

    /// Print the classpath of a source set
    Classpath {
        source_set: String,

        /// Print the runtime classpath instead of the compile classpath
        #[arg(long)]
        runtime: bool,
    },

    /// Print the resolved dependencies of a configuration
    Resolve { configuration: String },

    /// Report newer stable versions of declared dependencies
    DependencyUpdates {
        /// Release channel to consider (current, release-candidate, nightly)
        #[arg(long)]
        channel: Option<ReleaseChannel>,

        /// Version feed to read instead of the configured one
        #[arg(long)]
        feed: Option<PathBuf>,
    },

    /// Classify version strings as stable or unstable
    Stable {
        #[arg(required = true)]
        versions: Vec<String>,
    },
}

/// Flags shared by the commands that execute tasks
#[derive(Args, Debug, Default)]
pub struct ExecArgs {
    /// Show what would run without running anything
    #[arg(long)]
    pub dry_run: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => GlobalConfig::load()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose_ctx("buildplan", "starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.message(&format!("Initialized buildplan project at {}", project.root().display()));
        }

        Commands::Compile(exec) => build_cmd::run_target(&output, Target::Compile, exec.dry_run)?,
        Commands::Test(exec) => build_cmd::run_target(&output, Target::Test, exec.dry_run)?,
        Commands::FunctionalTest(exec) => {
            build_cmd::run_target(&output, Target::FunctionalTest, exec.dry_run)?
        }
        Commands::Check(exec) => build_cmd::run_target(&output, Target::Check, exec.dry_run)?,
        Commands::Run { tasks, exec } => build_cmd::run_tasks(&output, &tasks, exec.dry_run)?,
        Commands::Tasks => build_cmd::list(&output)?,

        Commands::Classpath { source_set, runtime } => {
            deps_cmd::classpath(&output, &source_set, runtime)?
        }
        Commands::Resolve { configuration } => deps_cmd::resolve(&output, &configuration)?,
        Commands::DependencyUpdates { channel, feed } => {
            deps_cmd::updates(&output, channel, feed)?
        }
        Commands::Stable { versions } => deps_cmd::stable(&output, &versions)?,
    }

    output.verbose_ctx("buildplan", "command completed");
    Ok(())
}
