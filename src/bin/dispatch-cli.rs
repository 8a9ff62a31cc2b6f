//! Offline inspection of a dispatcher configuration.
//!
//! Loads the same TOML file as the server and shows how requests would
//! resolve, without registering or invoking any handler.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use clean_dispatch::config::load_config;
use clean_dispatch::dispatch::Resolution;
use clean_dispatch::lifecycle::build_router;

#[derive(Parser)]
#[command(name = "dispatch-cli")]
#[command(about = "Inspect the route table of a clean-dispatch configuration", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes in match order
    Routes,
    /// Show how a request would resolve
    Match {
        /// HTTP method
        method: String,
        /// Request URI, including the mount path
        uri: String,
        /// Override the configured mount path
        #[arg(long)]
        script: Option<String>,
        /// Treat the client as a mobile device
        #[arg(long)]
        mobile: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;

    let output = match cli.command {
        Commands::Routes => {
            let router = build_router(&config.routes, &config.routing)?;
            routes(&router)
        }
        Commands::Match {
            method,
            uri,
            script,
            mobile,
        } => {
            if let Some(script) = script {
                config.routing.mount_path = script;
            }
            let router = build_router(&config.routes, &config.routing)?;
            let request = router.normalize(&method, &uri, "");
            let resolution = router.resolve(&request, &mobile);
            json!({
                "segments": request.segments(),
                "base_path": request.base_path(),
                "resolution": describe(&resolution),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn routes(router: &clean_dispatch::Router) -> Value {
    router
        .table()
        .iter()
        .map(|route| {
            json!({
                "pattern": route.pattern().to_string(),
                "handler": route.handler().to_string(),
                "device": route.device().as_str(),
                "dependencies": route.dependencies(),
                "args": route.args(),
            })
        })
        .collect()
}

fn describe(resolution: &Resolution<'_>) -> Value {
    match resolution {
        Resolution::Invoke { route, bindings } => json!({
            "outcome": resolution.label(),
            "pattern": route.pattern().to_string(),
            "handler": route.handler().to_string(),
            "variables": bindings,
        }),
        Resolution::Deflect(location) | Resolution::Fallback(location) => json!({
            "outcome": resolution.label(),
            "location": location,
        }),
        Resolution::NotFound(err) => json!({
            "outcome": resolution.label(),
            "status": err.status(),
            "method": err.method,
            "path": err.path,
        }),
    }
}
