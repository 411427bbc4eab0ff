//! User repository
//!
//! - insert: relies on the UNIQUE(email) constraint (no check-then-insert)
//! - update: single COALESCE statement, only supplied columns change

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{DbError, UserStore};
use crate::models::{NewUser, UserPatch};

/// User record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub nome: String,
    pub cognome: String,
    pub created_at: DateTime<Utc>,
}

/// User repository
#[derive(Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepo {
    async fn insert(&self, user: &NewUser) -> Result<User, DbError> {
        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (email, nome, cognome)
            VALUES ($1, $2, $3)
            RETURNING id, email, nome, cognome, created_at
            "#,
        )
        .bind(user.email.as_str())
        .bind(&user.nome)
        .bind(&user.cognome)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, DbError> {
        let users: Vec<User> = sqlx::query_as(
            r#"
            SELECT id, email, nome, cognome, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find(&self, id: i64) -> Result<Option<User>, DbError> {
        let user: Option<User> = sqlx::query_as(
            r#"
            SELECT id, email, nome, cognome, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, DbError> {
        let user: Option<User> = sqlx::query_as(
            r#"
            UPDATE users
            SET email = COALESCE($1, email),
                nome = COALESCE($2, nome),
                cognome = COALESCE($3, cognome)
            WHERE id = $4
            RETURNING id, email, nome, cognome, created_at
            "#,
        )
        .bind(patch.email.as_ref().map(|e| e.as_str()))
        .bind(patch.nome.as_deref())
        .bind(patch.cognome.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
