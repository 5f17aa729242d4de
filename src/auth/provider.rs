//! The credentials login flow.
//!
//! A login attempt moves through `received -> validated -> looked up -> verified`
//! and ends either authenticated, returning the user's [`SessionUser`], or in one
//! of the terminal [`AuthError`] states. No session is issued on failure.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use validator::Validate;

use crate::access::{AccessDecision, GateConfig};
use crate::auth::password::{BcryptVerifier, PasswordVerifier};
use crate::auth::{Credentials, LoginRequest};
use crate::error::AuthError;
use crate::models::{SessionUser, User};
use crate::store::UserStore;

/// Everything the login route and the access gate need from an authentication
/// backend.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Checks the shape of a submission. Never touches the store.
    fn validate(&self, input: LoginRequest) -> Result<Credentials, AuthError>;

    /// Fetches the user registered under `email`, if any.
    async fn lookup(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Compares `password` with the stored hash.
    async fn verify(&self, password: SecretString, password_hash: String)
        -> Result<bool, AuthError>;

    /// Access decision for a request path.
    fn decide(&self, is_authenticated: bool, path: &str) -> AccessDecision;

    /// Runs a complete login attempt.
    async fn authorize(&self, input: LoginRequest) -> Result<SessionUser, AuthError> {
        let credentials = self.validate(input)?;
        log::debug!("Login input validated");

        let user = self
            .lookup(&credentials.email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let identity = user.identity();

        if self.verify(credentials.password, user.password_hash).await? {
            Ok(identity)
        } else {
            Err(AuthError::PasswordMismatch)
        }
    }
}

/// Credentials provider backed by an injected user store and password verifier.
pub struct CredentialsAuthenticator {
    store: Arc<dyn UserStore>,
    verifier: Arc<dyn PasswordVerifier>,
    gate: GateConfig,
}

impl CredentialsAuthenticator {
    /// Uses bcrypt for password verification.
    pub fn new(store: Arc<dyn UserStore>, gate: GateConfig) -> Self {
        Self::with_verifier(store, Arc::new(BcryptVerifier), gate)
    }

    pub fn with_verifier(
        store: Arc<dyn UserStore>,
        verifier: Arc<dyn PasswordVerifier>,
        gate: GateConfig,
    ) -> Self {
        Self {
            store,
            verifier,
            gate,
        }
    }

    pub fn gate(&self) -> &GateConfig {
        &self.gate
    }
}

#[async_trait]
impl CredentialsProvider for CredentialsAuthenticator {
    fn validate(&self, input: LoginRequest) -> Result<Credentials, AuthError> {
        input.validate()?;
        Ok(Credentials {
            email: input.email,
            password: SecretString::from(input.password),
        })
    }

    async fn lookup(&self, email: &str) -> Result<Option<User>, AuthError> {
        self.store.find_by_email(email).await.map_err(|err| {
            log::error!("{}", err);
            AuthError::from(err)
        })
    }

    async fn verify(
        &self,
        password: SecretString,
        password_hash: String,
    ) -> Result<bool, AuthError> {
        let verifier = Arc::clone(&self.verifier);
        // bcrypt is CPU-bound; keep it off the request worker.
        tokio::task::spawn_blocking(move || {
            verifier.verify(password.expose_secret(), &password_hash)
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password verification task failed: {}", e)))?
        .map_err(|e| AuthError::Internal(e.to_string()))
    }

    fn decide(&self, is_authenticated: bool, path: &str) -> AccessDecision {
        self.gate.decide(is_authenticated, path)
    }
}
