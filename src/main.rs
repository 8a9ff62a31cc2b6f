//! `clean-dispatch` server binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use clean_dispatch::config::{load_config, watcher::ConfigWatcher, DispatcherConfig};
use clean_dispatch::handlers::{builtin, DependencyRegistry, HandlerRegistry};
use clean_dispatch::lifecycle::{build_dispatcher, wait_for_signal, Shutdown};
use clean_dispatch::observability::{init_logging, init_metrics};
use clean_dispatch::HttpServer;

#[derive(Parser)]
#[command(name = "clean-dispatch")]
#[command(about = "Clean-URL dispatcher", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload routes when the configuration file changes.
    #[arg(short, long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => DispatcherConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!("clean-dispatch v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount_path = %config.routing.mount_path,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut handlers = HandlerRegistry::new();
    builtin::register(&mut handlers);
    let handlers = Arc::new(handlers);
    let dependencies = Arc::new(DependencyRegistry::new());

    let dispatcher = build_dispatcher(&config, handlers.clone(), dependencies.clone())?;
    let server = HttpServer::new(&config, dispatcher);

    if let (true, Some(path)) = (args.watch, &args.config) {
        let (watcher, mut updates) = ConfigWatcher::new(path);
        let watch_handle = watcher.run()?;
        let active = server.dispatcher();

        tokio::spawn(async move {
            let _watch_handle = watch_handle;
            while let Some(config) = updates.recv().await {
                match build_dispatcher(&config, handlers.clone(), dependencies.clone()) {
                    Ok(dispatcher) => {
                        active.store(Arc::new(dispatcher));
                        tracing::info!("Route table reloaded");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Reload failed, keeping current routes");
                    }
                }
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
