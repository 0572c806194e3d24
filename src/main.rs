//! docroute service binary.
//!
//! Loads a TOML config, registers its resources against an in-memory
//! document store and serves them over HTTP or HTTPS.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use docroute::config::load_config;
use docroute::http::{load_tls_config, HttpServer};
use docroute::lifecycle::Shutdown;
use docroute::observability::{init_logging, init_metrics};
use docroute::resource::ResourceRegistry;
use docroute::store::{DocumentStore, MemoryStore};

#[derive(Parser)]
#[command(name = "docroute")]
#[command(about = "REST resources over a document store", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "docroute.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "docroute starting");
    tracing::info!(
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        resources = config.resources.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        init_metrics(addr)?;
    }

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let registry = ResourceRegistry::from_config(store, &config.resources)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.clone().trigger_on_ctrl_c());

    let addr: SocketAddr = config.listener.bind_address.parse()?;
    let tls = config.listener.tls.clone();
    let server = HttpServer::new(config, &registry);

    match tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls).await?;
            server.run_tls(addr, rustls, server_shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
