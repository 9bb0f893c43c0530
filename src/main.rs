use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use jobly_api::config::{config, AppConfig};
use jobly_api::database::DatabaseManager;
use jobly_api::handlers;

#[derive(Parser, Debug)]
#[command(name = "jobly-api", version, about = "Job board REST API")]
struct Args {
    /// Port to listen on (defaults to the configured API port)
    #[arg(long, env = "JOBLY_API_PORT")]
    port: Option<u16>,

    /// Database name to use in place of the one in DATABASE_URL
    #[arg(long, env = "JOBLY_DATABASE")]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = config();
    tracing::info!("Starting Jobly API in {:?} mode", config.environment);

    // Lazy so the server answers /health even while the database is down.
    let pool = DatabaseManager::connect_lazy(args.database.as_deref(), &config.database)?;

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Jobly API listening on http://{}", bind_addr);

    axum::serve(listener, app(handlers::router(pool), config)).await?;
    Ok(())
}

fn app(router: Router, config: &AppConfig) -> Router {
    let cors = if jobly_api::is_development!() || !config.security.enable_cors {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    let router = router.layer(
        ServiceBuilder::new()
            .layer(cors)
            .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
    );

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}
