mod config;
mod gate;
mod resolver;
mod routes;
mod store;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use gx365_common::{ReleaseClock, ReleasePolicy, TestMarker};
use tracing::{error, info};

use config::ReleaseConfig;
use gate::AssetGate;
use resolver::{MappingCache, MappingResolver};
use routes::{release_router, AppState};
use store::s3::S3Store;
use store::ObjectStore;

#[derive(Parser)]
#[command(name = "gx365-proxy")]
struct Args {
    /// Path to the release config YAML file.
    #[arg(long, env = "GX365_CONFIG")]
    config: PathBuf,

    /// Port to listen on.
    #[arg(long, default_value = "8787", env = "GX365_PORT")]
    port: u16,

    /// Address to bind to.
    #[arg(long, default_value = "0.0.0.0", env = "GX365_BIND")]
    bind: String,

    /// Directory holding the landing page, served for non-API paths.
    #[arg(long, env = "GX365_WEB_DIR")]
    web_dir: Option<PathBuf>,
}

fn configure_logging() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() {
    configure_logging();
    let args = Args::parse();

    let config = ReleaseConfig::load(&args.config).unwrap_or_else(|e| {
        error!("failed to load config {}: {e}", args.config.display());
        std::process::exit(1);
    });

    let policy = ReleasePolicy::new(
        ReleaseClock::system(config.release_year),
        TestMarker::new(&config.test_marker),
    );

    info!(
        "release year {} (cutoff today: {}), bucket {}",
        config.release_year,
        policy.current_cutoff(),
        config.storage.bucket
    );

    let store: Arc<dyn ObjectStore> = Arc::new(S3Store::new(&config.storage));

    let mut resolver = MappingResolver::new(store.clone(), policy.clone());
    if let Some(ttl) = config.mapping_cache_ttl() {
        let cache = MappingCache::new(ttl);
        info!("caching /tracks.json for {}s", cache.ttl().as_secs());
        resolver = resolver.with_cache(cache);
    }

    if let Some(ref web_dir) = args.web_dir {
        info!("serving landing page from {}", web_dir.display());
    }

    let state = Arc::new(AppState {
        resolver,
        gate: AssetGate::new(store, policy.clone()),
        policy,
        web_dir: args.web_dir.clone(),
    });

    let app = release_router(state);
    let addr = format!("{}:{}", args.bind, args.port);

    info!("binding to {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!("failed to bind to {addr}: {e}");
            std::process::exit(1);
        });

    info!("gx365-proxy listening on http://{addr}");
    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        std::process::exit(1);
    }
}
