//! API Server Entry Point
//!
//! Loads configuration, prepares the database and serves the account routes
//! under `/api/auth`. Startup errors use `anyhow`; request errors are
//! rendered by the accounts crate.

use std::net::SocketAddr;
use std::sync::Arc;

use accounts::domain::repository::TokenBlacklistRepository;
use accounts::presentation::{AccountAppState, routes};
use accounts::{AccountConfig, PgAccountRepository};
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::config::Env;
use platform::mail::{LogMailer, Mailer, SmtpMailer, SmtpSettings};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,accounts=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env = Env::from_process();

    // A random JWT secret is only acceptable in debug builds
    let account_config = AccountConfig::from_env(&env, cfg!(debug_assertions))?;

    // Database connection
    let database_url = env.require("DATABASE_URL")?;

    let pool = PgPoolOptions::new()
        .max_connections(env.parse_or("DATABASE_MAX_CONNECTIONS", 5)?)
        .connect(database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let repo = PgAccountRepository::new(pool.clone());

    // Startup cleanup: remove blacklist entries for expired tokens
    // Errors here should not prevent server startup
    if let Err(e) = repo.cleanup_expired().await {
        tracing::warn!(
            error = %e,
            "Token blacklist cleanup failed, continuing anyway"
        );
    }

    // Only debug builds may run without an SMTP relay
    let accounts = match SmtpSettings::from_env(&env, cfg!(debug_assertions))? {
        Some(settings) => {
            tracing::info!(host = %settings.host, port = settings.port, "Using SMTP relay");
            account_routes(repo, SmtpMailer::new(settings)?, account_config).await
        }
        None => {
            tracing::warn!("SMTP_HOST not set, emails will only be logged");
            account_routes(repo, LogMailer, account_config).await
        }
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = env
        .list_or(
            "FRONTEND_ORIGINS",
            "http://localhost:40922,http://127.0.0.1:40922",
        )
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/auth", accounts)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], env.parse_or("PORT", 31113)?));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Start the mail dispatcher, re-queue emails a previous run left pending,
/// and build the account routes
async fn account_routes<M>(repo: PgAccountRepository, mailer: M, config: AccountConfig) -> Router
where
    M: Mailer + Send + Sync + 'static,
{
    let state = AccountAppState::new(Arc::new(repo), Arc::new(mailer), config);

    match state.outbox.recover_pending().await {
        Ok(0) => {}
        Ok(count) => tracing::info!(emails = count, "Re-queued pending emails"),
        Err(e) => tracing::warn!(error = %e, "Pending email recovery failed, continuing anyway"),
    }

    routes(state)
}
