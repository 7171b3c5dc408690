//! `mvc-dispatch` command line.
//!
//! - `serve`: run the HTTP front end over a manifest's inspection controllers
//! - `resolve <path>`: print the target a path resolves to
//! - `check`: validate the configuration file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use mvc_dispatch::config::watcher::ConfigWatcher;
use mvc_dispatch::config::{load_config, AppConfig};
use mvc_dispatch::lifecycle::{spawn_signal_handler, Shutdown};
use mvc_dispatch::observability::{init_logging, init_metrics};
use mvc_dispatch::resolve::{Defaults, Manifest, Resolver};
use mvc_dispatch::routing::{Request, RouteTable};
use mvc_dispatch::HttpServer;

#[derive(Parser)]
#[command(name = "mvc-dispatch")]
#[command(about = "MVC route resolution and dispatch engine", long_about = None)]
struct Cli {
    /// Configuration file (defaults apply when absent).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the controllers declared in a manifest
    Serve {
        #[arg(short, long)]
        manifest: PathBuf,

        /// Reload the configuration file when it changes
        #[arg(long)]
        watch: bool,
    },
    /// Resolve a path against a manifest and print the target as JSON
    Resolve {
        #[arg(short, long)]
        manifest: PathBuf,

        path: String,
    },
    /// Validate the configuration file
    Check,
}

fn read_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(AppConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = read_config(cli.config.as_deref())?;
    init_logging(&config.observability)?;

    match cli.command {
        Commands::Serve { manifest, watch } => serve(config, cli.config, &manifest, watch).await,
        Commands::Resolve { manifest, path } => resolve(&config, &manifest, &path),
        Commands::Check => {
            println!(
                "configuration ok: {} route(s), default {}/{}",
                config.routes.len(),
                config.dispatch.controller,
                config.dispatch.action
            );
            Ok(())
        }
    }
}

async fn serve(
    config: AppConfig,
    config_path: Option<PathBuf>,
    manifest: &Path,
    watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("mvc-dispatch v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(Manifest::load(manifest)?.into_locator()?.inspection_registry());
    tracing::info!(
        bind_address = %config.listener.bind_address,
        controllers = registry.len(),
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must stay alive for updates to flow.
    let mut _watcher = None;
    let mut updates = None;
    if let (true, Some(path)) = (watch, config_path.as_deref()) {
        let (watcher, rx) = ConfigWatcher::new(path);
        _watcher = Some(watcher.run()?);
        updates = Some(rx);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, registry)?;
    server.run(listener, updates, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn resolve(config: &AppConfig, manifest: &Path, raw: &str) -> Result<(), Box<dyn std::error::Error>> {
    let locator = Manifest::load(manifest)?.into_locator()?;
    let routes = RouteTable::from_config(&config.routes)?;
    let resolver = Resolver::new(Defaults::from_config(&config.dispatch));

    let request = Request::builder("GET", raw)
        .base_path(config.dispatch.base_path.clone())
        .build();
    let rewritten = routes.rewrite(request.path());
    if rewritten != request.path() {
        eprintln!("rewritten: {} -> {}", request.path(), rewritten);
    }

    match resolver.resolve(&rewritten, &locator) {
        Ok(resolution) => {
            println!("{}", serde_json::to_string_pretty(&resolution)?);
            Ok(())
        }
        Err(missing) => {
            let module = missing.attempted_module.as_deref().unwrap_or("-");
            Err(format!("{} (attempted module: {})", missing, module).into())
        }
    }
}
