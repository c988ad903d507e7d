//! Per-request access decision.
//!
//! Route visibility is recorded once while the router is assembled: each
//! module may carry a marker, each handler may carry its own, and the
//! handler marker wins when both exist. Nothing here is mutated after
//! startup, so decisions run concurrently without locking.

use std::collections::HashMap;

use axum::http::Method;
use tracing::debug;

use crate::auth::strategy::AuthStrategy;
use crate::db::Identity;
use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

#[derive(Debug, Clone)]
struct HandlerEntry {
    module: &'static str,
    marker: Option<Visibility>,
}

/// Static `(module, handler) -> marker` table keyed by method and route template.
#[derive(Debug, Clone, Default)]
pub struct RouteMetadata {
    modules: HashMap<&'static str, Visibility>,
    handlers: HashMap<RouteKey, HandlerEntry>,
}

impl RouteMetadata {
    pub fn mark_module(&mut self, module: &'static str, marker: Visibility) {
        self.modules.insert(module, marker);
    }

    pub fn register(
        &mut self,
        module: &'static str,
        method: Method,
        path: &str,
        marker: Option<Visibility>,
    ) {
        self.handlers.insert(
            RouteKey {
                method,
                path: path.to_string(),
            },
            HandlerEntry { module, marker },
        );
    }

    /// Handler marker, else module marker, else `None`. HEAD is served by
    /// the GET handler, so it shares the GET entry.
    pub fn visibility(&self, method: &Method, path: &str) -> Option<Visibility> {
        let method = if method == Method::HEAD {
            Method::GET
        } else {
            method.clone()
        };
        let entry = self.handlers.get(&RouteKey {
            method,
            path: path.to_string(),
        })?;
        entry
            .marker
            .or_else(|| self.modules.get(entry.module).copied())
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.visibility(method, path) == Some(Visibility::Public)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    /// Proceed; carries the resolved identity when a token was checked.
    Allow(Option<Identity>),
    Deny(AuthError),
}

pub struct AccessGate<S> {
    auth_enabled: bool,
    routes: RouteMetadata,
    strategy: S,
}

impl<S: AuthStrategy> AccessGate<S> {
    pub fn new(auth_enabled: bool, routes: RouteMetadata, strategy: S) -> Self {
        Self {
            auth_enabled,
            routes,
            strategy,
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth_enabled
    }

    pub fn routes(&self) -> &RouteMetadata {
        &self.routes
    }

    pub async fn decide(&self, method: &Method, path: &str, bearer: Option<&str>) -> AccessDecision {
        if !self.auth_enabled {
            return AccessDecision::Allow(None);
        }
        if self.routes.is_public(method, path) {
            return AccessDecision::Allow(None);
        }
        let Some(token) = bearer else {
            debug!(%method, path, "no bearer token on protected route");
            return AccessDecision::Deny(AuthError::MissingToken);
        };
        match self.strategy.resolve(token).await {
            Ok(identity) => AccessDecision::Allow(Some(identity)),
            Err(e) => {
                debug!(%method, path, error = %e, "access denied");
                AccessDecision::Deny(e)
            }
        }
    }
}
