use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// A row of the `users` table.
///
/// Users are created out-of-band; this service only reads them. The bcrypt hash
/// is stored in the `password` column.
#[derive(Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

impl User {
    /// The public identity of this user, without the password hash.
    pub fn identity(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Identity handed back by a successful login and carried by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}
