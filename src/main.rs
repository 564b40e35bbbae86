mod logging;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::json;

use mock_registry::manifest::Manifest;
use mock_registry::registry::MockRegistry;
use mock_registry::version::types::EnvironmentDescriptor;

#[derive(Parser)]
#[command(name = "mock-registry")]
#[command(version, about = "Compatibility and load-order answers for versioned test doubles")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ManifestArgs {
    /// Registry manifest (JSON)
    #[arg(long)]
    manifest: PathBuf,
}

#[derive(Args)]
struct EnvironmentArgs {
    #[arg(long)]
    framework: Option<String>,
    #[arg(long)]
    test_runner: Option<String>,
    #[arg(long)]
    testing_library: Option<String>,
    #[arg(long)]
    typescript: Option<String>,
    /// Named dependency version, repeatable
    #[arg(long = "dep", value_name = "NAME=VERSION", value_parser = parse_dependency)]
    dependencies: Vec<(String, String)>,
}

impl From<EnvironmentArgs> for EnvironmentDescriptor {
    fn from(args: EnvironmentArgs) -> Self {
        Self {
            framework: args.framework,
            test_runner: args.test_runner,
            testing_library: args.testing_library,
            typescript: args.typescript,
            dependencies: args.dependencies.into_iter().collect(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Check a mock version against an environment
    Check {
        #[command(flatten)]
        manifest: ManifestArgs,
        #[arg(long)]
        mock: String,
        #[arg(long = "mock-version")]
        mock_version: String,
        #[command(flatten)]
        environment: EnvironmentArgs,
    },
    /// Print a mock and its transitive dependencies
    Tree {
        #[command(flatten)]
        manifest: ManifestArgs,
        #[arg(long)]
        mock: String,
    },
    /// Plan the migration from a version to the latest one
    Migrate {
        #[command(flatten)]
        manifest: ManifestArgs,
        #[arg(long)]
        mock: String,
        #[arg(long)]
        from: String,
    },
    /// Load a mock and its dependencies, printing the load order
    Load {
        #[command(flatten)]
        manifest: ManifestArgs,
        #[arg(long)]
        mock: String,
    },
    /// Print registry statistics
    Stats {
        #[command(flatten)]
        manifest: ManifestArgs,
    },
}

fn parse_dependency(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .filter(|(name, version)| !name.is_empty() && !version.is_empty())
        .map(|(name, version)| (name.to_string(), version.to_string()))
        .ok_or_else(|| format!("expected NAME=VERSION, got {:?}", value))
}

fn open(args: &ManifestArgs) -> anyhow::Result<MockRegistry> {
    let manifest = Manifest::from_path(&args.manifest)
        .with_context(|| format!("Failed to load {:?}", args.manifest))?;
    Ok(manifest.into_registry()?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.log_json, cli.log_file.as_deref())?;

    let output = match cli.command {
        Command::Check {
            manifest,
            mock,
            mock_version,
            environment,
        } => {
            let mut registry = open(&manifest)?;
            let result =
                registry.check_compatibility(&mock, &mock_version, &environment.into())?;
            serde_json::to_value(result)?
        }
        Command::Tree { manifest, mock } => {
            let registry = open(&manifest)?;
            json!(registry.get_dependency_tree(&mock))
        }
        Command::Migrate {
            manifest,
            mock,
            from,
        } => {
            let mut registry = open(&manifest)?;
            serde_json::to_value(registry.generate_migration_path(&mock, &from)?)?
        }
        Command::Load { manifest, mock } => {
            let mut registry = open(&manifest)?;
            let result = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(registry.load(&mock, None));
            json!({
                "success": result.success,
                "errors": result.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "warnings": result.warnings,
                "loadEvents": registry.load_events(),
                "elapsedMs": result.elapsed.as_secs_f64() * 1000.0,
            })
        }
        Command::Stats { manifest } => serde_json::to_value(open(&manifest)?.stats())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
