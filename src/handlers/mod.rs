pub mod auth;
pub mod books;
pub mod categories;
pub mod health;
