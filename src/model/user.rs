use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub role_id: u8,
    pub employee_id: Option<u64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub user_id: u64,
    pub revoked: bool,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Not revoked, not expired and issued to `user_id`.
    pub fn is_usable_by(&self, user_id: u64, now: DateTime<Utc>) -> bool {
        !self.revoked && self.user_id == user_id && self.expires_at > now
    }
}
