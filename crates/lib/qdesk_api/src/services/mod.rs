//! Business logic behind the handlers. Services take the store handles and
//! session issuer explicitly and know nothing about HTTP extraction.

pub mod auth;
pub mod departments;
pub mod tokens;
pub mod users;
