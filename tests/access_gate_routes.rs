use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use bookstore::auth::{TokenCodec, TokenSubject};
use bookstore::config::Config;
use serde_json::{Value, json};
use std::{
    fs,
    path::PathBuf,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

const SECRET: &str = "s1";

struct TestApp {
    app: Router,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.db_path);
    }
}

async fn spawn_app(auth_enabled: bool) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "bookstore-gate-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", db_path.display());
    let pool = bookstore::db::connect(&database_url)
        .await
        .expect("failed to open test database");

    let cfg = Config {
        database_url,
        auth_enabled,
        jwt_secret: Some(SECRET.to_string()),
        ..Config::default()
    };
    let app = bookstore::bookstore_router(Arc::new(cfg), pool);
    TestApp { app, db_path }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not json")
    };
    (status, json)
}

async fn signup_and_login(app: &Router) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({"username": "demo", "password": "1234", "email": "demo@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "demo", "password": "1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["user"].get("password_hash").is_none());
    body["access_token"]
        .as_str()
        .expect("missing access_token")
        .to_string()
}

#[tokio::test]
async fn disabled_auth_leaves_private_routes_open() {
    let t = spawn_app(false).await;

    let (status, body) = send(
        &t.app,
        "POST",
        "/book-categories",
        None,
        Some(json!({"name": "Fiction"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Fiction");

    let (status, _) = send(&t.app, "DELETE", "/book-categories/1", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn profile_needs_an_identity_even_when_auth_is_disabled() {
    let t = spawn_app(false).await;
    let (status, body) = send(&t.app, "GET", "/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn public_routes_accept_missing_or_invalid_tokens() {
    let t = spawn_app(true).await;

    for token in [None, Some("not-a-token")] {
        let (status, body) = send(&t.app, "GET", "/books", token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, _) = send(&t.app, "GET", "/health", token, None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn protected_routes_reject_missing_and_invalid_tokens() {
    let t = spawn_app(true).await;
    let book = json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "price": 18.99,
        "categoryId": 1,
    });

    let (status, body) = send(&t.app, "POST", "/books", None, Some(book.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(&t.app, "POST", "/books", Some("not-a-token"), Some(book)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &t.app,
        "POST",
        "/book-categories",
        None,
        Some(json!({"name": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_token_unlocks_protected_routes() {
    let t = spawn_app(true).await;
    let token = signup_and_login(&t.app).await;

    let (status, body) = send(&t.app, "GET", "/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "demo");
    assert_eq!(body["email"], "demo@example.com");

    let (status, category) = send(
        &t.app,
        "POST",
        "/book-categories",
        Some(&token),
        Some(json!({"name": "Science Fiction"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, book) = send(
        &t.app,
        "POST",
        "/books",
        Some(&token),
        Some(json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "price": 18.99,
            "categoryId": category["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["likeCount"], 0);

    let like_uri = format!("/books/{}/like", book["id"]);
    let (status, liked) = send(&t.app, "POST", &like_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liked["likeCount"], 1);
    assert_eq!(liked["category"]["name"], "Science Fiction");

    let (status, list) = send(&t.app, "GET", "/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["category"], json!({"id": category["id"], "name": "Science Fiction"}));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let t = spawn_app(true).await;
    signup_and_login(&t.app).await;

    let (status, body) = send(
        &t.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": "demo", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid username or password.");
}

#[tokio::test]
async fn token_for_unknown_subject_is_rejected() {
    let t = spawn_app(true).await;
    let codec = TokenCodec::new(SECRET, Duration::from_secs(3600));
    let token = codec
        .encode(&TokenSubject {
            id: 1,
            username: "demo".to_string(),
        })
        .expect("failed to sign token");

    let (status, _) = send(&t.app, "GET", "/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let t = spawn_app(true).await;
    signup_and_login(&t.app).await;
    let forged = TokenCodec::new("not-the-secret", Duration::from_secs(3600))
        .encode(&TokenSubject {
            id: 1,
            username: "demo".to_string(),
        })
        .expect("failed to sign token");

    let (status, _) = send(&t.app, "GET", "/auth/profile", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let t = spawn_app(true).await;
    signup_and_login(&t.app).await;
    let (status, body) = send(
        &t.app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({"username": "demo", "password": "x", "email": "other@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn missing_book_is_not_found() {
    let t = spawn_app(true).await;
    let (status, body) = send(&t.app, "GET", "/books/42", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Book with ID 42 not found");
}

#[tokio::test]
async fn invalid_book_payload_is_bad_request() {
    let t = spawn_app(false).await;
    let (status, body) = send(
        &t.app,
        "POST",
        "/books",
        None,
        Some(json!({"title": "", "author": "Nobody", "price": 10.0, "categoryId": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "title should not be empty");
}

#[tokio::test]
async fn head_on_public_routes_skips_the_gate() {
    let t = spawn_app(true).await;

    for uri in ["/books", "/health", "/book-categories"] {
        let (status, _) = send(&t.app, "HEAD", uri, None, None).await;
        assert_eq!(status, StatusCode::OK, "HEAD {uri}");
    }
    let (status, _) = send(&t.app, "HEAD", "/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn category_with_books_cannot_be_deleted() {
    let t = spawn_app(false).await;
    let (_, category) = send(
        &t.app,
        "POST",
        "/book-categories",
        None,
        Some(json!({"name": "Fiction"})),
    )
    .await;
    let (status, book) = send(
        &t.app,
        "POST",
        "/books",
        None,
        Some(json!({
            "title": "The Great Gatsby",
            "author": "F. Scott Fitzgerald",
            "price": 12.99,
            "categoryId": category["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let category_uri = format!("/book-categories/{}", category["id"]);
    let (status, body) = send(&t.app, "DELETE", &category_uri, None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let book_uri = format!("/books/{}", book["id"]);
    let (status, _) = send(&t.app, "DELETE", &book_uri, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&t.app, "DELETE", &category_uri, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn patch_with_null_clears_a_field() {
    let t = spawn_app(false).await;
    let (_, category) = send(
        &t.app,
        "POST",
        "/book-categories",
        None,
        Some(json!({"name": "Programming", "description": "Software books"})),
    )
    .await;
    let (_, book) = send(
        &t.app,
        "POST",
        "/books",
        None,
        Some(json!({
            "title": "Clean Code",
            "author": "Robert C. Martin",
            "price": 34.99,
            "isbn": "978-0132350884",
            "categoryId": category["id"],
        })),
    )
    .await;

    let uri = format!("/books/{}", book["id"]);
    let (status, patched) = send(&t.app, "PATCH", &uri, None, Some(json!({"isbn": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["isbn"], Value::Null);
    assert_eq!(patched["title"], "Clean Code");

    let uri = format!("/book-categories/{}", category["id"]);
    let (status, patched) = send(&t.app, "PATCH", &uri, None, Some(json!({"name": "Code"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["description"], "Software books");
}

#[tokio::test]
async fn unreadable_body_gets_error_envelope() {
    let t = spawn_app(false).await;

    let resp = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/book-categories")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body: Value = serde_json::from_slice(&bytes).expect("response body was not json");
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = send(
        &t.app,
        "POST",
        "/books",
        None,
        Some(json!({"title": "Dune", "author": "Frank Herbert", "price": "cheap", "categoryId": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn login_trims_username_like_signup() {
    let t = spawn_app(true).await;
    let (status, user) = send(
        &t.app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({"username": " reader ", "password": "1234", "email": "reader@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "reader");

    for username in [" reader ", "reader"] {
        let (status, _) = send(
            &t.app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"username": username, "password": "1234"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login as {username:?}");
    }
}
