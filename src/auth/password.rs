use crate::error::AppError;
use bcrypt::{hash, verify};

/// Cost used for newly created hashes.
pub const HASH_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, HASH_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// Compares a plaintext password with a stored hash.
///
/// Implementations must compare in constant time and must not keep or log the
/// plaintext.
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError>;
}

/// bcrypt: salted hashes, constant-time comparison.
#[derive(Debug, Default, Clone, Copy)]
pub struct BcryptVerifier;

impl PasswordVerifier for BcryptVerifier {
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        verify_password(password, password_hash)
    }
}
