use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::auth::token::TokenCodec;
use crate::db::Identity;
use crate::error::{AuthError, BookstoreError};

/// Read-only view of the credential store used while authenticating.
pub trait IdentityLookup: Send + Sync {
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<Identity>, BookstoreError>> + Send;
}

/// Turns a bearer token into a live identity.
pub trait AuthStrategy: Send + Sync {
    fn resolve(&self, token: &str) -> impl Future<Output = Result<Identity, AuthError>> + Send;
}

/// Verifies the token signature and expiry, then re-reads the subject from
/// the store so tokens of deleted users stop working.
pub struct JwtStrategy<L> {
    codec: Arc<TokenCodec>,
    lookup: L,
}

impl<L: IdentityLookup> JwtStrategy<L> {
    pub fn new(codec: Arc<TokenCodec>, lookup: L) -> Self {
        Self { codec, lookup }
    }
}

impl<L: IdentityLookup> AuthStrategy for JwtStrategy<L> {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let payload = self.codec.decode(token).inspect_err(|e| {
            debug!(error = %e, "rejecting bearer token");
        })?;

        let found = self
            .lookup
            .find_by_username(&payload.username)
            .await
            .map_err(|e| AuthError::LookupFailed(e.to_string()))?;

        match found {
            Some(identity) => Ok(identity),
            None => {
                debug!(
                    subject = payload.sub,
                    username = %payload.username,
                    "token subject not found"
                );
                Err(AuthError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::token::TokenSubject;
    use crate::error::DecodeError;
    use chrono::{TimeDelta, Utc};
    use std::collections::HashMap;
    use std::time::Duration;

    /// In-memory credential store for exercising the auth core.
    #[derive(Default)]
    pub(crate) struct MemoryLookup {
        users: HashMap<String, Identity>,
        pub(crate) fail: bool,
    }

    impl MemoryLookup {
        pub(crate) fn with(identities: impl IntoIterator<Item = Identity>) -> Self {
            Self {
                users: identities
                    .into_iter()
                    .map(|i| (i.username.clone(), i))
                    .collect(),
                fail: false,
            }
        }
    }

    impl IdentityLookup for MemoryLookup {
        async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, BookstoreError> {
            if self.fail {
                return Err(BookstoreError::DatabaseError(sqlx::Error::PoolTimedOut));
            }
            Ok(self.users.get(username).cloned())
        }
    }

    pub(crate) fn demo_identity() -> Identity {
        Identity {
            id: 1,
            username: "demo".into(),
            password_hash: String::new(),
            email: "demo@example.com".into(),
        }
    }

    fn setup(lookup: MemoryLookup) -> (Arc<TokenCodec>, JwtStrategy<MemoryLookup>) {
        let codec = Arc::new(TokenCodec::new("s1", Duration::from_secs(3600)));
        (codec.clone(), JwtStrategy::new(codec, lookup))
    }

    fn demo_token(codec: &TokenCodec) -> String {
        codec
            .encode(&TokenSubject {
                id: 1,
                username: "demo".into(),
            })
            .unwrap()
    }

    #[tokio::test]
    async fn resolves_known_subject() {
        let (codec, strategy) = setup(MemoryLookup::with([demo_identity()]));
        let identity = strategy.resolve(&demo_token(&codec)).await.unwrap();
        assert_eq!(identity.id, 1);
        assert_eq!(identity.username, "demo");
    }

    #[tokio::test]
    async fn deleted_subject_is_unauthorized() {
        let (codec, strategy) = setup(MemoryLookup::default());
        assert_eq!(
            strategy.resolve(&demo_token(&codec)).await,
            Err(AuthError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn expired_and_malformed_are_invalid_credentials() {
        let (codec, strategy) = setup(MemoryLookup::with([demo_identity()]));
        let expired = codec
            .encode_at(
                &TokenSubject {
                    id: 1,
                    username: "demo".into(),
                },
                Utc::now() - TimeDelta::hours(3),
            )
            .unwrap();

        assert_eq!(
            strategy.resolve(&expired).await,
            Err(AuthError::InvalidCredentials(DecodeError::Expired))
        );
        assert_eq!(
            strategy.resolve("not.a.token").await,
            Err(AuthError::InvalidCredentials(DecodeError::Invalid))
        );
    }

    #[tokio::test]
    async fn store_failure_is_not_reported_as_unauthorized() {
        let mut lookup = MemoryLookup::with([demo_identity()]);
        lookup.fail = true;
        let (codec, strategy) = setup(lookup);
        assert!(matches!(
            strategy.resolve(&demo_token(&codec)).await,
            Err(AuthError::LookupFailed(_))
        ));
    }
}
