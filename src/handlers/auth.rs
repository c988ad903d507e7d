use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use crate::auth::TokenSubject;
use crate::auth::password::verify_password;
use crate::db::Identity;
use crate::error::{AuthError, BookstoreError};
use crate::middleware::CurrentUser;
use crate::router::BookstoreState;
use crate::types::{LoginRequest, LoginResponse, SignupRequest};

/// POST /auth/signup
pub async fn signup(
    State(state): State<BookstoreState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Identity>), BookstoreError> {
    let Json(req) = body?;
    req.validate()?;
    let user = state
        .users
        .create_user(req.username.trim(), &req.password, &req.email)
        .await?;
    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login -> issues a bearer token for valid credentials.
pub async fn login(
    State(state): State<BookstoreState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, BookstoreError> {
    let Json(req) = body?;
    let Some(user) = state.users.find_by_username(req.username.trim()).await? else {
        return Err(AuthError::InvalidLogin.into());
    };
    if !verify_password(req.password, user.password_hash.clone()).await? {
        return Err(AuthError::InvalidLogin.into());
    }

    let access_token = state.codec.encode(&TokenSubject {
        id: user.id,
        username: user.username.clone(),
    })?;
    info!(user_id = user.id, username = %user.username, "issued access token");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.codec.ttl().as_secs(),
        user,
    }))
}

/// GET /auth/profile
pub async fn profile(CurrentUser(user): CurrentUser) -> Json<Identity> {
    Json(user)
}
