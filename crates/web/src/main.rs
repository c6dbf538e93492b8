use anyhow::Context;
use leaderboard::{MonthPolicy, OcrDistanceExtractor, OllamaClient, SystemClock, UpdateEngine};
use std::sync::Arc;
use storage::Database;
use web::{AppState, app, config::Config, middleware::auth::ApiKeys};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting running challenge bot");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let ollama = OllamaClient::new(config.ollama_url.clone(), config.ollama_model.clone());
    match ollama.health_check().await {
        Ok(true) => tracing::info!("Ollama reachable at {}", config.ollama_url),
        _ => tracing::warn!(
            "Ollama not reachable at {}, image updates will fail",
            config.ollama_url
        ),
    }

    let api_keys = ApiKeys::from_comma_separated(&config.webhook_keys);
    if api_keys.is_empty() {
        tracing::warn!("WEBHOOK_KEYS is empty, every webhook batch will be rejected");
    }

    let db = Arc::new(db);
    let engine = UpdateEngine::new(db.clone(), Arc::new(OcrDistanceExtractor::new(ollama)))
        .with_month_policy(MonthPolicy::new(
            config.month_hour_offset,
            Arc::new(SystemClock),
        ));

    let state = AppState {
        engine: Arc::new(engine),
        leaderboards: db,
        verifier: Arc::new(api_keys),
    };

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", bind_address);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
