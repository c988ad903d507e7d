use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::BookstoreError;
use crate::router::BookstoreState;

/// Bound the whole request, identity lookup included. On expiry the inner
/// future is dropped; nothing on the read path needs undoing.
pub async fn request_timeout(
    State(state): State<BookstoreState>,
    req: Request,
    next: Next,
) -> Result<Response, BookstoreError> {
    let limit = state.config.request_timeout();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    tokio::time::timeout(limit, next.run(req))
        .await
        .map_err(|_| {
            warn!(%method, path = %path, timeout_secs = limit.as_secs(), "request timed out");
            BookstoreError::Timeout
        })
}
