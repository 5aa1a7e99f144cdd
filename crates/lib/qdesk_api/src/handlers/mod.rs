//! Request handlers.

pub mod accounts;
pub mod auth;
pub mod departments;
pub mod health;
pub mod tokens;
pub mod users;
