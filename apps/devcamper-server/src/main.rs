use anyhow::{bail, Context, Result};
use api_ingress::ApiIngressConfig;
use axum::Router;
use clap::{Parser, Subcommand};
use devcamper::config::DevcamperConfig;
use devcamper::domain::ports::Geocoder;
use devcamper::infra::geocoder::MapquestGeocoder;
use devcamper::infra::jwt::JwtTokenIssuer;
use devcamper::infra::password::Argon2PasswordHasher;
use devcamper::infra::seed::Seeder;
use devcamper::{Devcamper, Ports};
use docstore::MemoryStore;
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// DevCamper API Server - bootcamp directory backend
#[derive(Parser)]
#[command(name = "devcamper-server")]
#[command(about = "DevCamper API Server - bootcamp directory backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Load or remove fixture data in the store snapshot
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
}

#[derive(Subcommand)]
enum SeedAction {
    /// Import bootcamps, courses, users and reviews from JSON files
    Import {
        /// Directory with the fixture files (overrides store.seed_dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Delete every document
    Destroy,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("DevCamper Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
        Commands::Seed { action } => run_seed(config, action).await,
    }
}

fn module_config(config: &AppConfig) -> Result<DevcamperConfig> {
    Ok(config
        .module_config::<DevcamperConfig>("devcamper")?
        .unwrap_or_default())
}

fn ingress_config(config: &AppConfig) -> Result<ApiIngressConfig> {
    let from_modules = config.module_config::<ApiIngressConfig>("api_ingress")?;
    Ok(from_modules.unwrap_or_else(|| {
        ApiIngressConfig::for_server(
            &config.server.host,
            config.server.port,
            config.server.timeout_sec,
        )
    }))
}

fn snapshot_path(config: &AppConfig) -> Option<PathBuf> {
    config
        .store
        .as_ref()
        .and_then(|s| s.snapshot_file.as_deref())
        .map(|p| config.resolve_path(p))
}

/// A geocoder when an API key is configured.
fn geocoder(config: &AppConfig) -> Result<Option<Arc<dyn Geocoder>>> {
    let cfg = config.geocoder.clone().unwrap_or_default();
    if cfg.api_key.trim().is_empty() {
        return Ok(None);
    }
    let geocoder = MapquestGeocoder::new(
        &cfg.base_url,
        cfg.api_key,
        Duration::from_millis(cfg.timeout_ms),
    )?;
    Ok(Some(Arc::new(geocoder)))
}

fn build_ports(config: &AppConfig) -> Result<Ports> {
    let auth = config
        .auth
        .as_ref()
        .context("auth section is required to serve the API")?;
    if auth.jwt_secret.trim().is_empty() {
        bail!("auth.jwt_secret must be set (e.g. APP__AUTH__JWT_SECRET)");
    }
    let geocoder = geocoder(config)?.context("geocoder.api_key must be set to serve the API")?;

    Ok(Ports {
        geocoder,
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens: Arc::new(JwtTokenIssuer::new(&auth.jwt_secret, auth.jwt_expire_days)),
    })
}

fn load_snapshot(store: &MemoryStore, path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) if p.exists() => {
            store
                .load_snapshot(p)
                .with_context(|| format!("failed to load snapshot {}", p.display()))?;
        }
        Some(p) => tracing::info!("No snapshot at {}, starting empty", p.display()),
        None => tracing::warn!("No snapshot file configured, data lives in memory only"),
    }
    Ok(())
}

fn save_snapshot(store: &MemoryStore, path: Option<&Path>) -> Result<()> {
    if let Some(p) = path {
        store
            .save_snapshot(p)
            .with_context(|| format!("failed to save snapshot {}", p.display()))?;
    }
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");

    let ports = build_ports(&config)?;
    let store = MemoryStore::new();
    let module = Devcamper::new(module_config(&config)?, store.clone(), ports)?;

    let snapshot = snapshot_path(&config);
    load_snapshot(&store, snapshot.as_deref())?;

    let ingress = ingress_config(&config)?;
    let addr = ingress.socket_addr()?;
    let router = api_ingress::build_router(module.register_rest(Router::new())?, &ingress);

    api_ingress::serve(router, addr, async {
        if let Err(e) = api_ingress::wait_for_shutdown().await {
            tracing::error!("Shutdown signal handler failed: {}", e);
        }
    })
    .await?;

    let save_on_shutdown = config.store.as_ref().is_some_and(|s| s.save_on_shutdown);
    if save_on_shutdown {
        save_snapshot(&store, snapshot.as_deref())?;
    }
    tracing::info!("DevCamper Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    module_config(&config)?;
    ingress_config(&config)?.socket_addr()?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_seed(config: AppConfig, action: SeedAction) -> Result<()> {
    let snapshot = snapshot_path(&config).context("store.snapshot_file must be set to seed")?;

    let store = MemoryStore::new();
    let seeder = Seeder::new(
        store.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        geocoder(&config)?,
    );
    load_snapshot(&store, Some(&snapshot))?;

    let report = match action {
        SeedAction::Import { dir } => {
            let dir = match dir {
                Some(d) => d,
                None => config
                    .store
                    .as_ref()
                    .and_then(|s| s.seed_dir.as_deref())
                    .map(|d| config.resolve_path(d))
                    .context("no seed directory: pass --dir or set store.seed_dir")?,
            };
            let report = seeder.import_dir(&dir).await?;
            println!("Data Imported... ({} documents)", report.total());
            report
        }
        SeedAction::Destroy => {
            let report = seeder.destroy().await?;
            println!("Data Destroyed... ({} documents)", report.total());
            report
        }
    };
    tracing::debug!(?report, "seed finished");

    save_snapshot(&store, Some(&snapshot))
}
