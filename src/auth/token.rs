use crate::error::AppError;
use crate::models::SessionUser;
use actix_web::cookie::{self, Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// Represents the claims encoded within a session JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: Uuid,
    /// The user's email at sign-in time.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

impl Claims {
    pub fn user(&self) -> SessionUser {
        SessionUser {
            id: self.sub,
            email: self.email.clone(),
        }
    }
}

/// Signs and verifies session tokens and builds the session cookie.
///
/// Built once at startup from the configured secret and shared by the login
/// routes and the access gate.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionIssuer {
    pub fn new(secret: &SecretString, ttl: Duration, secure_cookie: bool) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            secure_cookie,
        }
    }

    /// Issues a token for `user`, valid for the configured TTL.
    ///
    /// # Returns
    /// The encoded JWT, or `AppError::InternalServerError` if the expiry cannot be
    /// represented or signing fails.
    pub fn issue_token(&self, user: &SessionUser) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("Session TTL out of range".into()))?;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature and expiry of a token and returns its claims.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, tampered with, or
    /// expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }

    /// Cookie carrying a freshly issued token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .max_age(cookie::time::Duration::seconds(self.ttl.num_seconds()))
            .finish()
    }

    /// Expired cookie that clears the session in the browser.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut removal = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .finish();
        removal.make_removal();
        removal
    }
}
