use tracker_api::{config, db::Database, server};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("starting Tracker API in {:?} mode", config.environment);

    if config.database.run_migrations_on_startup {
        if let Err(e) = Database::migrate().await {
            // The server still starts; /health reports the database as degraded
            tracing::warn!("could not run migrations at startup: {}", e);
        }
    }

    let app = server::app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Tracker API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
