//! HS256 token codec.
//!
//! Tokens carry the subject id and username plus `iat`/`exp`. Expiry is
//! checked here against an explicit clock rather than inside `jsonwebtoken`,
//! so decoding is a pure function of token, secret and time.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BookstoreError, DecodeError};

/// The identity a token claims to represent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: i64,
    pub username: String,
}

/// Decoded claims. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub sub: i64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenPayload {
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.sub,
            username: self.username.clone(),
        }
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn encode(&self, subject: &TokenSubject) -> Result<String, BookstoreError> {
        self.encode_at(subject, Utc::now())
    }

    pub fn encode_at(
        &self,
        subject: &TokenSubject,
        issued_at: DateTime<Utc>,
    ) -> Result<String, BookstoreError> {
        let iat = issued_at.timestamp();
        let payload = TokenPayload {
            sub: subject.id,
            username: subject.username.clone(),
            iat,
            exp: iat.saturating_add(self.ttl.as_secs() as i64),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)?)
    }

    pub fn decode(&self, token: &str) -> Result<TokenPayload, DecodeError> {
        self.decode_at(token, Utc::now())
    }

    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenPayload, DecodeError> {
        let data = decode::<TokenPayload>(token, &self.decoding, &self.validation)
            .map_err(|_| DecodeError::Invalid)?;
        if data.claims.exp <= now.timestamp() {
            return Err(DecodeError::Expired);
        }
        Ok(data.claims)
    }
}
