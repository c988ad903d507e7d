//! Request and response payloads exchanged over HTTP.

pub mod auth;
pub mod book;
pub mod category;

pub use auth::{LoginRequest, LoginResponse, SignupRequest};
pub use book::{CreateBook, UpdateBook};
pub use category::{CreateCategory, UpdateCategory};

use serde::{Deserialize, Deserializer};

/// For `Option<Option<T>>` patch fields: absent stays `None` (via
/// `#[serde(default)]`), explicit `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
