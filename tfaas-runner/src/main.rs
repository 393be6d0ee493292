//! TFaaS Runner - loads the model area and serves predictions over HTTP.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;

use tfaas_runner::{api, logging, AppState, Config, FsModelStore, ModelRegistry};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    println!("tfaas-runner {}", VERSION);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        print_version();
        return Ok(());
    }

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure config.toml exists or set TFAAS__MODELS__DIR.",
            e
        )
    })?;

    logging::init(&config.logging.level);
    tracing::info!(
        model_dir = %config.models.dir.display(),
        default_model = config.models.default_model.as_deref().unwrap_or("-"),
        "Starting tfaas-runner {}",
        VERSION
    );

    let store = Arc::new(FsModelStore::new(config.models.dir.clone()));
    let registry = Arc::new(ModelRegistry::new(store));

    // A model area that does not load completely is not served.
    if config.runner.eager_load {
        let count = registry.discover().await.map_err(|e| {
            tracing::error!(error = %e, "Model discovery failed");
            format!("Failed to load models: {}", e)
        })?;
        tracing::info!(count, "All models loaded");
    }

    let state = Arc::new(AppState::new(config.clone(), registry));
    let app = api::app(state);

    // Start server
    let addr = format!("{}:{}", config.api.host, config.api.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
