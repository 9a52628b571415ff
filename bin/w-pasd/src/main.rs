//! ---
//! pas_section: "01-core-functionality"
//! pas_subsection: "binary"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Binary entrypoint for the W-PAS daemon."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};
use w_pas_api::{spawn_api_server, ApiServer, ApiState};
use w_pas_common::config::AppConfig;
use w_pas_common::logging::init_tracing;
use w_pas_common::version::VersionInfo;
use w_pas_policy::audit::DecisionLog;
use w_pas_policy::catalog::CategoryCatalog;
use w_pas_policy::directory::RoleDirectory;
use w_pas_policy::metrics::AccessMetrics;
use w_pas_telemetry::{new_registry, spawn_http_server, DaemonMetrics};

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    version = concat!("W-PAS ", env!("CARGO_PKG_VERSION"), " (", env!("VERGEN_GIT_SHA"), ")"),
    about = "W-PAS daemon",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run the access decision service")]
    Run,
    #[command(about = "Load and validate configuration, catalogue, and role seed, then exit")]
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let version = VersionInfo::current();
    if cli.version {
        println!("{}", version.extended());
        return Ok(());
    }
    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("/etc/w-pas/config.toml"));
    candidates.push(PathBuf::from("configs/example.dev.toml"));

    let load_started = Instant::now();
    let loaded = AppConfig::load_with_source(&candidates)?;
    let load_duration = load_started.elapsed();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            run_daemon(loaded.config, loaded.source, version, load_duration).await?
        }
        Commands::CheckConfig => check_config(&loaded.config, &loaded.source)?,
    }

    Ok(())
}

async fn run_daemon(
    config: AppConfig,
    config_path: PathBuf,
    version: VersionInfo,
    load_duration: Duration,
) -> Result<()> {
    init_tracing("w-pasd", &config.logging)?;
    info!("{}", version.banner());
    info!(config_path = %config_path.display(), "configuration loaded");

    let registry = new_registry();
    let daemon_metrics = DaemonMetrics::new(registry.clone())?;
    daemon_metrics.observe_config_load(load_duration.as_secs_f64());
    daemon_metrics.inc_start();
    daemon_metrics.set_build_info(&version.semver, &version.git_sha, &version.profile);

    let catalog = build_catalog(&config)?;
    info!(paths = catalog.len(), "category catalogue ready");

    let directory = RoleDirectory::new(catalog);
    if let Some(seed) = &config.roles.seed_path {
        let seeded = directory.seed_from_file(seed)?;
        info!(roles = seeded, seed = %seed.display(), "role directory seeded");
    }

    let audit = if config.audit.enabled {
        if let Some(parent) = config.audit.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!(path = %config.audit.path.display(), "decision audit trail enabled");
        Some(DecisionLog::new(&config.audit.path)?)
    } else {
        None
    };

    let access_metrics = AccessMetrics::new(registry.clone())?;

    let metrics_server = if config.metrics.enabled {
        info!(address = %config.metrics.listen, "metrics exporter enabled");
        Some(spawn_http_server(registry.clone(), config.metrics.listen)?)
    } else {
        info!("metrics exporter disabled by configuration");
        None
    };

    let mut api_server: Option<ApiServer> = None;
    if config.api.enabled {
        let state = Arc::new(ApiState::new(
            directory,
            access_metrics,
            audit,
            version.clone(),
        ));
        match spawn_api_server(state, config.api.listen) {
            Ok(server) => {
                info!(address = %server.addr(), "api server listening");
                api_server = Some(server);
            }
            Err(err) => {
                warn!(error = %err, "failed to start api server");
            }
        }
    } else {
        info!("api server disabled by configuration");
    }

    info!("daemon running; waiting for termination signal");
    signal::ctrl_c().await?;
    info!("ctrl-c received; shutting down");

    if let Some(server) = api_server {
        server.shutdown().await?;
    }
    if let Some(server) = metrics_server {
        server.shutdown().await?;
    }

    Ok(())
}

fn check_config(config: &AppConfig, source: &Path) -> Result<()> {
    let catalog = build_catalog(config)?;
    let directory = RoleDirectory::new(catalog.clone());
    let mut seeded = 0;
    if let Some(seed) = &config.roles.seed_path {
        seeded = directory.seed_from_file(seed)?;
    }

    println!("Configuration: {}", source.display());
    println!("Catalogue paths: {}", catalog.len());
    println!("Seeded roles: {}", seeded);
    println!(
        "Metrics exporter: {} ({})",
        enabled_str(config.metrics.enabled),
        config.metrics.listen
    );
    println!(
        "API server: {} ({})",
        enabled_str(config.api.enabled),
        config.api.listen
    );
    println!(
        "Decision audit: {} ({})",
        enabled_str(config.audit.enabled),
        config.audit.path.display()
    );
    Ok(())
}

fn build_catalog(config: &AppConfig) -> Result<Arc<CategoryCatalog>> {
    let catalog = match &config.catalog.path {
        Some(path) => CategoryCatalog::from_toml_file(path)?,
        None => CategoryCatalog::builtin().clone(),
    };
    Ok(Arc::new(catalog))
}

fn enabled_str(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
