//! Schema bootstrap
//!
//! Every statement is idempotent, so this runs on each server start and
//! from `meditactive setup-db`.

use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email VARCHAR(255) NOT NULL UNIQUE,
        nome VARCHAR(100) NOT NULL,
        cognome VARCHAR(100) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS intervals (
        id BIGSERIAL PRIMARY KEY,
        start_date DATE NOT NULL,
        end_date DATE NOT NULL,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interval_goals (
        id BIGSERIAL PRIMARY KEY,
        interval_id BIGINT NOT NULL REFERENCES intervals(id) ON DELETE CASCADE,
        goal_name VARCHAR(255) NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_intervals_user_id ON intervals(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_intervals_created_at ON intervals(created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_interval_goals_interval_id ON interval_goals(interval_id)",
];

/// Create tables and indexes if they do not exist yet.
pub async fn ensure(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring database schema...");

    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::debug!(statements = STATEMENTS.len(), "schema up to date");
    Ok(())
}
