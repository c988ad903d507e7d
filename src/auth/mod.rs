//! Authentication core: token codec, identity resolution and the access gate.

pub mod gate;
pub mod password;
pub mod strategy;
pub mod token;

pub use gate::{AccessDecision, AccessGate, RouteMetadata, Visibility};
pub use strategy::{AuthStrategy, IdentityLookup, JwtStrategy};
pub use token::{TokenCodec, TokenPayload, TokenSubject};
