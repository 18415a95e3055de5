use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::error::StoreResult;
use crate::model::user::{RefreshTokenRecord, User};

/// Login accounts and issued refresh tokens.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role_id: u8,
        employee_id: Option<u64>,
    ) -> StoreResult<u64>;

    async fn touch_last_login(&self, user_id: u64, at: DateTime<Utc>) -> StoreResult<()>;

    async fn store_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn find_refresh_token(&self, jti: &str) -> StoreResult<Option<RefreshTokenRecord>>;

    /// Revokes `old_jti` and records `new_jti` in one step. `false` when
    /// `old_jti` was already revoked or unknown.
    async fn rotate_refresh_token(
        &self,
        old_jti: &str,
        user_id: u64,
        new_jti: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    async fn revoke_refresh_token(&self, jti: &str) -> StoreResult<bool>;
}

#[derive(Clone)]
pub struct MySqlAccountStore {
    pool: MySqlPool,
}

impl MySqlAccountStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for MySqlAccountStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, role_id, employee_id, is_active
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role_id: u8,
        employee_id: Option<u64>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"INSERT INTO users (username, password, role_id, employee_id) VALUES (?, ?, ?, ?)"#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role_id)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn touch_last_login(&self, user_id: u64, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(at)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn store_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query("INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(jti)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_refresh_token(&self, jti: &str) -> StoreResult<Option<RefreshTokenRecord>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT user_id, revoked, expires_at FROM refresh_tokens WHERE jti = ?",
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn rotate_refresh_token(
        &self,
        old_jti: &str,
        user_id: u64,
        new_jti: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ? AND revoked = FALSE",
        )
        .bind(old_jti)
        .execute(&mut *tx)
        .await?;

        if revoked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(new_jti)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn revoke_refresh_token(&self, jti: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
            .bind(jti)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
