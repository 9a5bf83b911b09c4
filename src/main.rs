//! Active Router CLI
//!
//! # Commands
//!
//! ```text
//! match <pathname> -p <pattern>...   match one pathname, print the JSON result
//! check -c <config>                  load and validate a route table
//! simulate -c <config> <path>...     mount the route table, navigate, print
//!                                    every notification as a JSON line
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use active_router::bindings::{RootRouter, RouteDeclaration};
use active_router::config::{load_config, RouterConfig};
use active_router::observability::logging::init_logging;
use active_router::router::{Listener, RenderSignal, RouterEngine};
use active_router::routing::{match_path, MatchOptions};
use active_router::state::{History, MemoryHistory};

#[derive(Parser)]
#[command(name = "active-router")]
#[command(about = "Route matching and dispatch simulator", long_about = None)]
struct Cli {
    /// Log level when RUST_LOG is unset (overrides the config file).
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a pathname against one or more patterns
    Match {
        pathname: String,
        /// Pattern to try; repeat for alternatives
        #[arg(short, long = "pattern", required = true)]
        patterns: Vec<String>,
        #[arg(long)]
        exact: bool,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        sensitive: bool,
    },
    /// Validate a configuration file
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Replay navigations against a configured route table
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// Paths to navigate to, in order
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Match {
            pathname,
            patterns,
            exact,
            strict,
            sensitive,
        } => {
            init_logging(cli.log_level.as_deref().unwrap_or("warn"))?;
            let options = MatchOptions::new(patterns)
                .exact(exact)
                .strict(strict)
                .sensitive(sensitive);
            let matched = match_path(&pathname, &options)?;
            println!("{}", serde_json::to_string_pretty(&matched)?);
        }
        Commands::Check { config } => {
            let config = load_config(&config)?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.observability.log_level))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "root": config.router.root,
                    "routes": config.routes.iter().map(|r| &r.name).collect::<Vec<_>>(),
                    "valid": true,
                }))?
            );
        }
        Commands::Simulate { config, paths } => {
            let config = load_config(&config)?;
            init_logging(cli.log_level.as_deref().unwrap_or(&config.observability.log_level))?;
            simulate(&config, &paths).await?;
        }
    }

    Ok(())
}

async fn simulate(config: &RouterConfig, paths: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let history = Arc::new(MemoryHistory::new(&config.router.root));
    let engine = RouterEngine::with_config(history.clone(), config.matching.clone());
    let router = RootRouter::initialize(&engine, &config.router, history.clone()).await?;

    let mut subscriptions = Vec::with_capacity(config.routes.len());
    for route in &config.routes {
        let declaration = RouteDeclaration::from_config(route, config.matching.sensitive);
        let name = route.name.clone();
        let listener = Listener::deferred(move |matched| {
            println!("{}", json!({ "route": name, "match": matched }));
            Ok(RenderSignal::settled())
        });
        subscriptions.push(engine.subscribe(declaration.descriptor(listener)?)?);
    }

    for path in paths {
        println!("{}", json!({ "navigate": path }));
        history.push(path);
        router.flush().await?;
    }

    for subscription in &subscriptions {
        subscription.unsubscribe();
    }
    tracing::info!(
        navigations = paths.len(),
        routes = subscriptions.len(),
        "Simulation complete"
    );
    Ok(())
}
