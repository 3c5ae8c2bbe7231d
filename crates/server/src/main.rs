//! Storefront Server
//!
//! Axum server and CLI over the storefront core: catalog browsing with
//! search, and install/uninstall persisted in the local store.

mod api;
mod state;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use storefront_core::{
    catalog::filter, BroadcastNotifier, Catalog, InstallationRegistry, Notification, Notifier,
    SqliteStore, StorefrontConfig,
};

use crate::state::{AppState, SharedState};

const DEFAULT_PORT: u16 = 8080;

#[derive(Parser, Clone)]
#[command(author, version, about = "Storefront - browse and install apps")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the Storefront server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// List catalog apps, optionally filtered by name
    List {
        /// Case-insensitive name search
        query: Option<String>,
    },
    /// Show installed apps
    Installed,
    /// Install an app from the catalog
    Install {
        /// App name, exactly as listed
        name: String,
    },
    /// Uninstall an app
    Uninstall {
        /// App name
        name: String,
    },
}

/// Prints confirmations to the terminal
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        println!("{}", notification.message());
    }
}

fn open_registry(
    config: &StorefrontConfig,
    notifier: Arc<dyn Notifier>,
) -> anyhow::Result<InstallationRegistry> {
    let store = SqliteStore::open_at(config.database_path())
        .with_context(|| format!("Failed to open store at {:?}", config.database_path()))?;
    Ok(InstallationRegistry::initialize(Arc::new(store), notifier))
}

/// Load the catalog for one-shot CLI commands. Failure yields an empty catalog.
async fn load_catalog(config: &StorefrontConfig) -> Catalog {
    let loader = match config.catalog_loader() {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Error loading store: {}", e);
            return Catalog::empty();
        }
    };

    loader.load().await.unwrap_or_else(|e| {
        eprintln!("Error loading store: {}", e);
        Catalog::empty()
    })
}

/// Install `name` if the catalog lists it
fn install_from_catalog(
    catalog: &Catalog,
    registry: &mut InstallationRegistry,
    name: &str,
) -> anyhow::Result<()> {
    let Some(app) = catalog.get(name) else {
        anyhow::bail!("{} is not in the catalog", name);
    };
    registry.install(app)?;
    Ok(())
}

async fn run_cli(command: CliCommand, config: StorefrontConfig) -> anyhow::Result<()> {
    match command {
        CliCommand::Serve { port } => run_server(config, port).await,
        CliCommand::List { query } => {
            let catalog = load_catalog(&config).await;
            let registry = open_registry(&config, Arc::new(ConsoleNotifier))?;

            for app in filter(&catalog, query.as_deref().unwrap_or("")) {
                let marker = if registry.is_installed(&app.name) {
                    "[installed]"
                } else {
                    "           "
                };
                println!("{} {:<24} {}", marker, app.name, app.description);
                for feature in &app.features {
                    println!("              - {}", feature);
                }
            }
            Ok(())
        }
        CliCommand::Installed => {
            let registry = open_registry(&config, Arc::new(ConsoleNotifier))?;
            for name in registry.installed().iter() {
                println!("{}", name);
            }
            Ok(())
        }
        CliCommand::Install { name } => {
            let catalog = load_catalog(&config).await;
            let mut registry = open_registry(&config, Arc::new(ConsoleNotifier))?;
            install_from_catalog(&catalog, &mut registry, &name)
        }
        CliCommand::Uninstall { name } => {
            let mut registry = open_registry(&config, Arc::new(ConsoleNotifier))?;
            registry.uninstall(&name)?;
            Ok(())
        }
    }
}

// === Server Entry ===

pub async fn run_server(config: StorefrontConfig, port: u16) -> anyhow::Result<()> {
    let notifier = BroadcastNotifier::new(100);
    let registry = open_registry(&config, Arc::new(notifier.clone()))?;
    let loader = config
        .catalog_loader()
        .context("Failed to build catalog loader")?;
    let source = loader.source().describe();

    let state: SharedState = Arc::new(AppState::new(loader, registry, notifier));

    // Initial load runs in the background; the API serves an empty catalog until it lands
    let loading = Arc::clone(&state);
    tokio::spawn(async move {
        loading.reload_catalog().await;
    });

    let app = api::router().with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("Storefront server running at http://{}", addr);
    tracing::info!("Catalog source: {}", source);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = StorefrontConfig::load().await;
    let command = args.command.unwrap_or(CliCommand::Serve { port: DEFAULT_PORT });

    run_cli(command, config).await
}
