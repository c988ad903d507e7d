use serde::{Deserialize, Serialize};

use crate::db::Identity;
use crate::error::BookstoreError;

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: Identity,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), BookstoreError> {
        if self.username.trim().is_empty() {
            return Err(BookstoreError::validation("username should not be empty"));
        }
        if self.password.is_empty() {
            return Err(BookstoreError::validation("password should not be empty"));
        }
        if !self.email.contains('@') {
            return Err(BookstoreError::validation("email must be an email"));
        }
        Ok(())
    }
}
