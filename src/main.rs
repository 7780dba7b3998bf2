use anyhow::Context;
use library_catalog::{
    adapters::{
        memory::{
            BookRepository as InMemoryBookRepository, LoanRepository as InMemoryLoanRepository,
        },
        postgres::{PostgresBookRepository, PostgresLoanRepository},
    },
    api::{handlers::AppState, router::create_router},
    application::ServiceDependencies,
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_catalog=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Initialize adapters
    let service_deps = match &config.database_url {
        Some(database_url) => {
            tracing::info!(max_connections = config.max_connections, "connecting to database");

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;

            ServiceDependencies::new(
                Arc::new(PostgresBookRepository::new(pool.clone())),
                Arc::new(PostgresLoanRepository::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory repositories");
            let books = Arc::new(InMemoryBookRepository::new());
            ServiceDependencies::new(books.clone(), Arc::new(InMemoryLoanRepository::new(books)))
        }
    };

    // Create application state
    let app_state = Arc::new(AppState {
        service_deps,
        default_page_size: config.default_page_size,
    });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
