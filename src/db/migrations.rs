//! Database migrations
//!
//! Code-based migrations embedded in the binary for single-file deployment.
//! Applied versions are tracked in a `schema_migrations` table; running the
//! set repeatedly is a no-op.

use anyhow::{Context, Result};
use sqlx::Row;

use super::DbPool;

/// A single schema migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements to apply
    pub up: &'static str,
}

/// All migrations, in order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_dealers",
        up: r#"
            CREATE TABLE IF NOT EXISTS dealers (
                dealer_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_dealers_name ON dealers(name);
        "#,
    },
    Migration {
        version: 2,
        name: "create_auth_tokens",
        up: r#"
            CREATE TABLE IF NOT EXISTS auth_tokens (
                dealer_id INTEGER PRIMARY KEY,
                token VARCHAR(64) NOT NULL,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (dealer_id) REFERENCES dealers(dealer_id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_auth_tokens_expires_at ON auth_tokens(expires_at);
        "#,
    },
    Migration {
        version: 3,
        name: "create_cars",
        up: r#"
            CREATE TABLE IF NOT EXISTS cars (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                make VARCHAR(100) NOT NULL,
                model VARCHAR(100) NOT NULL,
                year INTEGER NOT NULL,
                number_plate VARCHAR(20) NOT NULL,
                dealer_id INTEGER NOT NULL,
                FOREIGN KEY (dealer_id) REFERENCES dealers(dealer_id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_cars_dealer_id ON cars(dealer_id);
            CREATE INDEX IF NOT EXISTS idx_cars_make_model ON cars(dealer_id, make, model);
        "#,
    },
];

/// Run all pending migrations against the pool.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    ensure_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        // SQLite executes one statement at a time through sqlx
        for statement in migration
            .up
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            sqlx::query(statement).execute(pool).await.with_context(|| {
                format!("Failed to apply migration {} ({})", migration.version, migration.name)
            })?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to record migration {}", migration.version))?;
    }

    Ok(())
}

async fn ensure_migrations_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    Ok(())
}

async fn applied_versions(pool: &DbPool) -> Result<Vec<i32>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    Ok(rows.iter().map(|r| r.get::<i32, _>("version")).collect())
}
