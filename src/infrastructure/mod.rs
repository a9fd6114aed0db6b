//! Infrastructure layer - Hashing, tokens, stores and observability

pub mod auth;
pub mod credential;
pub mod logging;
pub mod observability;
