use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use typo3_upgrade_analyzer::analysis::{BatchAnalyzer, Extension, ExtensionCompatibilityResolver};
use typo3_upgrade_analyzer::config::{self, AnalyzerConfig};
use typo3_upgrade_analyzer::git::ProviderFactory;
use typo3_upgrade_analyzer::version::registries::{TerRegistry, ter};
use typo3_upgrade_analyzer::version::{ConstraintChecker, Version};

#[derive(Parser)]
#[command(name = "typo3-upgrade-analyzer")]
#[command(
    version,
    about = "Finds releases of TYPO3 extensions that are compatible with a target core version"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze the extensions listed in a JSON file
    Analyze {
        /// Target TYPO3 version (e.g., 12.4.0)
        #[arg(long)]
        target: String,

        /// JSON array of `{key, repositoryUrl?, metadata?}`
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Write JSON logs to a file (default location when no path is given)
        #[arg(long)]
        log_file: Option<Option<PathBuf>>,

        /// Skip the TER lookup
        #[arg(long)]
        no_registry: bool,
    },

    /// Check a single composer constraint against a target version
    CheckConstraint {
        constraint: String,

        #[arg(long)]
        target: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            target,
            input,
            config,
            log_file,
            no_registry,
        } => {
            let log_file = log_file.map(|path| path.unwrap_or_else(config::log_path));
            let _guard = init_logging(log_file.as_deref())?;

            let target = parse_target(&target)?;
            let config = AnalyzerConfig::load(config.as_deref())
                .context("Failed to load configuration")?;

            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(analyze(&input, &target, &config, no_registry))?;

            Ok(ExitCode::SUCCESS)
        }
        Command::CheckConstraint { constraint, target } => {
            let _guard = init_logging(None)?;
            let target = parse_target(&target)?;

            if ConstraintChecker::new().is_constraint_compatible(&constraint, &target) {
                println!("compatible");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("incompatible");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

async fn analyze(
    input: &Path,
    target: &Version,
    config: &AnalyzerConfig,
    no_registry: bool,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let extensions: Vec<Extension> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    let lookup = Arc::new(ProviderFactory::from_config(config));
    let mut analyzer = BatchAnalyzer::new(ExtensionCompatibilityResolver::new(lookup))
        .with_max_concurrency(config.max_concurrency);

    if config.registry.enabled && !no_registry {
        let base_url = config
            .registry
            .base_url
            .as_deref()
            .unwrap_or(ter::DEFAULT_BASE_URL);
        analyzer = analyzer.with_registry(Arc::new(TerRegistry::with_timeout(
            base_url,
            Some(config.request_timeout()),
        )));
    }

    let reports = analyzer.analyze(&extensions, target).await;
    println!("{}", serde_json::to_string_pretty(&reports)?);

    Ok(())
}

fn parse_target(target: &str) -> anyhow::Result<Version> {
    Version::parse(target).context("Invalid --target")
}

/// Log to stderr, or as JSON lines to `log_file`
///
/// The returned guard flushes the file writer and must be held until exit.
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(writer))
        .try_init()?;

    Ok(Some(guard))
}
