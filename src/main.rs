use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use julia_version::action::{self, ActionInputs};
use julia_version::config::ResolverConfig;
use julia_version::version::batch::BatchResolver;
use julia_version::version::registries::{HttpNightlyProber, JuliaLangCatalogue};
use julia_version::version::resolver::VersionResolver;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "julia-version")]
#[command(about = "Resolve Julia version specifiers to concrete Julia versions")]
struct Cli {
    /// Version specifier or YAML list of specifiers (e.g. "1", "lts", "[min, 1.10-nightly]")
    #[arg(long, env = "INPUT_VERSION")]
    version: String,

    /// Julia project directory or file, used by "min" and "manifest"
    #[arg(long, env = "INPUT_PROJECT")]
    project: Option<String>,

    /// Behavior when a specifier resolves to no version: "warn" or "error"
    #[arg(long, env = "INPUT_IF-MISSING", default_value = "error")]
    if_missing: String,

    /// JSON file overriding the default resolver configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(format: LogFormat) -> tracing_appender::non_blocking::WorkerGuard {
    let default_level = if std::env::var("RUNNER_DEBUG").as_deref() == Ok("1") {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(writer).with_target(false))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .init(),
    }

    guard
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ResolverConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ResolverConfig::default(),
    };

    let inputs = ActionInputs {
        version: cli.version,
        project: ActionInputs::project_path(
            cli.project.as_deref(),
            std::env::var("JULIA_PROJECT").ok().as_deref(),
        ),
        if_missing: cli.if_missing,
    };

    let resolver = BatchResolver::new(
        Arc::new(JuliaLangCatalogue::from_config(&config)),
        Arc::new(HttpNightlyProber::from_config(&config)),
        VersionResolver::new(&config.lts_version).context("Invalid LTS version in config")?,
    );

    let outputs = action::run(&inputs, &resolver).await?;
    for warning in outputs.warning_annotations() {
        println!("{warning}");
    }

    let destination = std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from);
    outputs
        .write(destination.as_deref())
        .context("Failed to write action outputs")
}

/// Single-line `::error::` command carrying the whole error chain
fn failure_annotation(err: &anyhow::Error) -> String {
    action::error_annotation(&format!("{err:#}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_format);

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{:?}", e);
            println!("{}", failure_annotation(&e));
            ExitCode::FAILURE
        }
    }
}
