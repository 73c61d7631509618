use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use argon2::password_hash::rand_core::{OsRng, RngCore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carstock::api::{build_router, AppState};
use carstock::config::Config;
use carstock::db::repositories::{
    SqlxCarRepository, SqlxDealerRepository, SqlxSessionTokenRepository,
};
use carstock::db::{create_pool, migrations};
use carstock::services::assertion::AssertionSigner;
use carstock::services::{AuthService, CarService};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carstock=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        database = %config.database.url,
        "Starting carstock"
    );

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;
    migrations::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let signer = match &config.auth.secret {
        Some(secret) => AssertionSigner::new(secret.as_bytes()),
        None => {
            tracing::warn!(
                "No auth secret configured; using a random one, sessions will not survive a restart"
            );
            let mut secret = [0u8; 32];
            OsRng.fill_bytes(&mut secret);
            AssertionSigner::new(&secret)
        }
    };

    let auth_service = Arc::new(AuthService::with_session_expiration(
        SqlxDealerRepository::boxed(pool.clone()),
        SqlxSessionTokenRepository::boxed(pool.clone()),
        signer,
        config.auth.session_expiration_days,
    ));
    let car_service = Arc::new(CarService::new(SqlxCarRepository::boxed(pool.clone())));

    match auth_service.cleanup_expired_tokens().await {
        Ok(deleted) if deleted > 0 => {
            tracing::info!(deleted, "Removed expired session tokens")
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to sweep expired session tokens"),
    }

    let state = AppState {
        auth_service,
        car_service,
    };
    let app = build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
