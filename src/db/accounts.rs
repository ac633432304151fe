// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite-backed account store with typed operations.

use crate::error::AppError;
use crate::models::Account;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

const MAX_CONNECTIONS: u32 = 8;

/// Account store client.
#[derive(Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    /// Connect to the database named by `database_url`, creating it if needed.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(format!("Invalid DATABASE_URL: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        tracing::info!("Connected to account database");
        Ok(Self { pool })
    }

    /// Private in-memory database, schema applied. Used by tests.
    pub async fn in_memory() -> Result<Self, AppError> {
        // Every connection to `sqlite::memory:` is its own database, so pin
        // the pool to a single connection that never gets recycled.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the schema if it does not exist.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                bio TEXT,
                avatar_url TEXT,
                github_token TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a new account. A taken email yields `Conflict`.
    pub async fn create(&self, account: &Account) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO accounts
                (id, name, email, password_hash, bio, avatar_url, github_token,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.bio)
        .bind(&account.avatar_url)
        .bind(&account.github_token)
        .bind(&account.created_at)
        .bind(&account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "User already exists"))?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>, AppError> {
        Ok(
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Look up by (already normalized) email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        Ok(
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Persist every mutable field of `account`. A taken email yields `Conflict`.
    pub async fn update(&self, account: &Account) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE accounts
             SET name = ?, email = ?, password_hash = ?, bio = ?, avatar_url = ?,
                 github_token = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.bio)
        .bind(&account.avatar_url)
        .bind(&account.github_token)
        .bind(&account.updated_at)
        .bind(&account.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Email already in use"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Account {}", account.id)));
        }
        Ok(())
    }

    /// Delete an account. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// A taken email becomes `Conflict(message)`; other errors pass through.
fn map_unique_violation(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::from(err),
    }
}
