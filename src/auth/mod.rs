pub mod extractors;
pub mod middleware;
pub mod password;
pub mod provider;
pub mod token;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::models::SessionUser;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AccessGate;
pub use password::{hash_password, verify_password, BcryptVerifier, PasswordVerifier};
pub use provider::{CredentialsAuthenticator, CredentialsProvider};
pub use token::{Claims, SessionIssuer, SESSION_COOKIE};

/// A login submission, as received in a JSON or form body.
///
/// Missing fields default to empty strings so they surface as validation
/// failures rather than parse errors.
#[derive(Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
    /// Page to return to after a successful form login.
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

/// Credentials that passed validation. Consumed by a single login attempt.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Body returned by a successful JSON login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The session token, also set as the session cookie.
    pub token: String,
    pub user: SessionUser,
}
