//! User lookup against the persistent store.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DataAccessError;
use crate::models::User;

const FIND_BY_EMAIL: &str = "SELECT * FROM users WHERE email = $1";

/// Read access to user records.
///
/// `Ok(None)` means no user has that email. Transport and decoding failures are
/// `Err`; implementations do not retry.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DataAccessError>;
}

/// Postgres-backed store. The pool is opened and closed by the application.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DataAccessError> {
        let user = sqlx::query_as::<_, User>(FIND_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
