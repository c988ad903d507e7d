use axum::extract::{FromRequestParts, MatchedPath, Request, State};
use axum::http::{HeaderMap, request::Parts};
use axum::middleware::Next;
use axum::response::Response;
use headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::auth::AccessDecision;
use crate::db::Identity;
use crate::error::{AuthError, BookstoreError};
use crate::router::BookstoreState;

/// Token from `Authorization: Bearer <token>`, if present and well-formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Route layer running the access gate for every matched route.
/// On success the resolved identity, if any, is stored in request extensions.
pub async fn require_access(
    State(state): State<BookstoreState>,
    mut req: Request,
    next: Next,
) -> Result<Response, BookstoreError> {
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let token = bearer_token(req.headers());

    match state.gate.decide(&method, &path, token.as_deref()).await {
        AccessDecision::Allow(identity) => {
            if let Some(identity) = identity {
                req.extensions_mut().insert(identity);
            }
            Ok(next.run(req).await)
        }
        AccessDecision::Deny(reason) => Err(reason.into()),
    }
}

/// The identity attached by [`require_access`]. Rejects with 401 when the
/// gate did not resolve one (public route, or authentication disabled).
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = BookstoreError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(BookstoreError::Auth(AuthError::MissingToken))
    }
}
