use std::sync::Arc;

use axum::{
    Router,
    handler::Handler,
    http::Method,
    middleware::from_fn_with_state,
    routing::{MethodFilter, on},
};

use crate::auth::Visibility::{Protected, Public};
use crate::auth::{AccessGate, JwtStrategy, RouteMetadata, TokenCodec, Visibility};
use crate::config::Config;
use crate::db::{CatalogStore, SqlitePool, UserStore};
use crate::handlers::{auth, books, categories, health};
use crate::middleware::{request_timeout, require_access};

pub type Gate = AccessGate<JwtStrategy<UserStore>>;

#[derive(Clone)]
pub struct BookstoreState {
    pub config: Arc<Config>,
    pub users: UserStore,
    pub catalog: CatalogStore,
    pub codec: Arc<TokenCodec>,
    pub gate: Arc<Gate>,
}

impl BookstoreState {
    pub fn new(config: Arc<Config>, pool: SqlitePool, routes: RouteMetadata) -> Self {
        let users = UserStore::new(pool.clone());
        let codec = Arc::new(TokenCodec::new(config.jwt_secret(), config.jwt_ttl()));
        let strategy = JwtStrategy::new(codec.clone(), users.clone());
        let gate = Arc::new(AccessGate::new(config.auth_enabled, routes, strategy));
        Self {
            config,
            users,
            catalog: CatalogStore::new(pool),
            codec,
            gate,
        }
    }
}

/// Routes plus their visibility markers, collected side by side so every
/// registered handler has a metadata entry.
pub struct RouteTable {
    router: Router<BookstoreState>,
    metadata: RouteMetadata,
}

impl RouteTable {
    fn new() -> Self {
        Self {
            router: Router::new(),
            metadata: RouteMetadata::default(),
        }
    }

    fn module(mut self, name: &'static str, marker: Visibility) -> Self {
        self.metadata.mark_module(name, marker);
        self
    }

    fn route<H, T>(
        mut self,
        module: &'static str,
        method: Method,
        path: &'static str,
        handler: H,
        marker: Option<Visibility>,
    ) -> Self
    where
        H: Handler<T, BookstoreState>,
        T: 'static,
    {
        let filter = MethodFilter::try_from(method.clone())
            .unwrap_or_else(|e| panic!("cannot route {method} {path}: {e}"));
        self.metadata.register(module, method, path, marker);
        self.router = self.router.route(path, on(filter, handler));
        self
    }

    pub fn metadata(&self) -> &RouteMetadata {
        &self.metadata
    }
}

pub fn route_table() -> RouteTable {
    RouteTable::new()
        .module("health", Public)
        .route("health", Method::GET, "/health", health::health, None)
        .module("auth", Public)
        .route("auth", Method::POST, "/auth/signup", auth::signup, None)
        .route("auth", Method::POST, "/auth/login", auth::login, None)
        .route("auth", Method::GET, "/auth/profile", auth::profile, Some(Protected))
        .route("books", Method::GET, "/books", books::list_books, Some(Public))
        .route("books", Method::GET, "/books/{id}", books::get_book, Some(Public))
        .route("books", Method::POST, "/books", books::create_book, None)
        .route("books", Method::PATCH, "/books/{id}", books::update_book, None)
        .route("books", Method::DELETE, "/books/{id}", books::delete_book, None)
        .route("books", Method::POST, "/books/{id}/like", books::like_book, None)
        .module("book-categories", Public)
        .route(
            "book-categories",
            Method::GET,
            "/book-categories",
            categories::list_categories,
            None,
        )
        .route(
            "book-categories",
            Method::GET,
            "/book-categories/{id}",
            categories::get_category,
            None,
        )
        .route(
            "book-categories",
            Method::POST,
            "/book-categories",
            categories::create_category,
            Some(Protected),
        )
        .route(
            "book-categories",
            Method::PATCH,
            "/book-categories/{id}",
            categories::update_category,
            Some(Protected),
        )
        .route(
            "book-categories",
            Method::DELETE,
            "/book-categories/{id}",
            categories::delete_category,
            Some(Protected),
        )
}

/// Assemble the application: routes, access gate and request timeout.
pub fn bookstore_router(config: Arc<Config>, pool: SqlitePool) -> Router {
    let RouteTable { router, metadata } = route_table();
    let state = BookstoreState::new(config, pool, metadata);
    router
        .route_layer(from_fn_with_state(state.clone(), require_access))
        .layer(from_fn_with_state(state.clone(), request_timeout))
        .with_state(state)
}
