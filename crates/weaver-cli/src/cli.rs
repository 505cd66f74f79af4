//! Command line definition and dispatch for `note-weaver`.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use eyre::{Context, Result};
use tracing::{info, warn};
use weaver_bdd::{
    Feature, RunOptions, Runner, StepRegistry, TagExpression, load_features, validate_feature,
};
use weaver_site::{DriverConfig, HttpDriver, SiteWorld, http_world_factory, site_registry};

use crate::config::{LogLevel, Overrides, RunnerConfig};
use crate::output::{ReportFormat, write_definitions, write_group_separator, write_report};

/// Run the Note Weaver acceptance scenarios.
#[derive(Parser, Debug)]
#[command(name = "note-weaver", version, about)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,
    #[command(subcommand)]
    pub command: Command,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run scenarios against the site.
    Run(RunArgs),
    /// Validate feature files and check every step has a definition.
    Check(CheckArgs),
    /// List step definitions.
    Steps(StepsArgs),
}

/// Arguments of `note-weaver run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Feature files or directories to search for them.
    #[arg(default_value = "features")]
    pub paths: Vec<PathBuf>,
    /// Root URL of the site under test.
    #[arg(long)]
    pub base_url: Option<String>,
    /// Only run scenarios whose tags match, e.g. `@smoke and not @wip`.
    #[arg(long)]
    pub tags: Option<TagExpression>,
    /// Scenarios to run at once.
    #[arg(long)]
    pub jobs: Option<NonZeroUsize>,
    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Fail the run when a scenario is skipped.
    #[arg(long)]
    pub fail_on_skipped: bool,
    /// Per-request timeout in seconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,
}

/// Arguments of `note-weaver check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Feature files or directories to search for them.
    #[arg(default_value = "features")]
    pub paths: Vec<PathBuf>,
}

/// Arguments of `note-weaver steps`.
#[derive(Args, Debug)]
pub struct StepsArgs {
    /// Only list definitions no feature step uses.
    #[arg(long, conflicts_with = "duplicates")]
    pub unused: bool,
    /// List groups of definitions sharing a keyword and pattern.
    #[arg(long)]
    pub duplicates: bool,
    /// Emit every definition as JSON.
    #[arg(long, conflicts_with_all = ["unused", "duplicates"])]
    pub json: bool,
    /// Feature files consulted by `--unused`.
    #[arg(default_value = "features")]
    pub paths: Vec<PathBuf>,
}

/// How a command finished when it did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every scenario passed, or no issue was found.
    Success,
    /// A scenario failed, or an issue was found.
    Failure,
}

impl Cli {
    /// Configuration from the environment with this invocation's flags on
    /// top.
    ///
    /// The base URL is only validated for `run`, the one command that talks
    /// to the site.
    ///
    /// # Errors
    /// Returns an error for invalid environment values, or an unusable base
    /// URL when running scenarios.
    pub fn config(&self) -> Result<RunnerConfig> {
        let mut overrides = Overrides {
            log_level: self.log_level,
            ..Overrides::default()
        };
        if let Command::Run(args) = &self.command {
            overrides.base_url.clone_from(&args.base_url);
            overrides.jobs = args.jobs;
            overrides.fail_on_skipped = args.fail_on_skipped;
            overrides.timeout_secs = args.timeout_secs;
        }
        let config = RunnerConfig::from_env()?.apply_overrides(overrides);
        if matches!(self.command, Command::Run(_)) {
            config.routes()?;
        }
        Ok(config)
    }
}

/// Execute the parsed command.
///
/// # Errors
/// Returns an error when features cannot be loaded or output cannot be
/// written.
pub fn dispatch(cli: Cli, config: &RunnerConfig) -> Result<Outcome> {
    match cli.command {
        Command::Run(args) => handle_run(args, config),
        Command::Check(args) => handle_check(&args.paths),
        Command::Steps(args) => handle_steps(&args),
    }
}

fn registry() -> Result<StepRegistry<SiteWorld<HttpDriver>>> {
    site_registry().wrap_err("failed to register site steps")
}

fn load(paths: &[PathBuf]) -> Result<Vec<Feature>> {
    load_features(paths).wrap_err("failed to load feature files")
}

fn handle_run(args: RunArgs, config: &RunnerConfig) -> Result<Outcome> {
    let features = load(&args.paths)?;
    for issue in features.iter().flat_map(validate_feature) {
        warn!(%issue, "feature file issue");
    }
    let driver = DriverConfig {
        timeout: config.timeout,
        ..DriverConfig::default()
    };
    let runner = Runner::new(registry()?, http_world_factory(config.routes()?, driver))
        .with_options(RunOptions {
            jobs: config.jobs,
            tags: args.tags,
            fail_on_skipped: config.fail_on_skipped,
        });
    info!(base_url = %config.base_url, features = features.len(), "running acceptance suite");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("failed to start async runtime")?;
    let report = runtime.block_on(runner.run(&features));

    write_to(args.output.as_deref(), |writer| {
        write_report(writer, &report, args.format)
    })?;
    Ok(if report.is_success() {
        Outcome::Success
    } else {
        Outcome::Failure
    })
}

fn handle_check(paths: &[PathBuf]) -> Result<Outcome> {
    let features = load(paths)?;
    let registry = registry()?;
    let issues: Vec<String> = features
        .iter()
        .flat_map(validate_feature)
        .map(|issue| issue.to_string())
        .chain(
            registry
                .unbound_steps(&features)
                .iter()
                .map(ToString::to_string),
        )
        .collect();
    let mut stdout = io::stdout().lock();
    for issue in &issues {
        writeln!(stdout, "{issue}").wrap_err("failed to write check result")?;
    }
    writeln!(
        stdout,
        "{} feature file(s) checked, {} issue(s)",
        features.len(),
        issues.len()
    )
    .wrap_err("failed to write check summary")?;
    Ok(if issues.is_empty() {
        Outcome::Success
    } else {
        Outcome::Failure
    })
}

fn handle_steps(args: &StepsArgs) -> Result<Outcome> {
    let registry = registry()?;
    let mut stdout = io::stdout().lock();
    if args.json {
        let json = registry
            .dump_json()
            .wrap_err("failed to serialise step definitions")?;
        writeln!(stdout, "{json}").wrap_err("failed to write step definitions")?;
    } else if args.duplicates {
        for group in registry.duplicates() {
            write_definitions(&mut stdout, &group)?;
            write_group_separator(&mut stdout)?;
        }
    } else if args.unused {
        let features = load(&args.paths)?;
        write_definitions(&mut stdout, &registry.unused(&features))?;
    } else {
        let all: Vec<_> = registry.definitions().iter().collect();
        write_definitions(&mut stdout, &all)?;
    }
    stdout
        .flush()
        .wrap_err("failed to flush step listing to stdout")?;
    Ok(Outcome::Success)
}

fn write_to<F>(path: Option<&Path>, render: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let Some(path) = path else {
        let mut stdout = io::stdout().lock();
        render(&mut stdout)?;
        return stdout.flush().wrap_err("failed to flush report to stdout");
    };
    let file = std::fs::File::create(path)
        .wrap_err_with(|| format!("failed to create report file {}", path.display()))?;
    let mut writer = io::BufWriter::new(file);
    render(&mut writer)?;
    writer
        .flush()
        .wrap_err_with(|| format!("failed to write report file {}", path.display()))
}
