//! Argon2id password hashing. Hashing runs on the blocking pool so it never
//! stalls a request worker.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::BookstoreError;

pub async fn hash_password(password: String) -> Result<String, BookstoreError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| BookstoreError::PasswordHash(e.to_string()))
    })
    .await
    .map_err(|e| BookstoreError::PasswordHash(format!("hashing task failed: {e}")))?
}

/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool, BookstoreError> {
    tokio::task::spawn_blocking(move || -> Result<bool, BookstoreError> {
        let parsed =
            PasswordHash::new(&stored_hash).map_err(|e| BookstoreError::PasswordHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| BookstoreError::PasswordHash(format!("verification task failed: {e}")))?
}
