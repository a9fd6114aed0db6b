//! Credential store implementations
//!
//! In-memory storage for development and tests, PostgreSQL for deployments.

mod in_memory;
mod postgres_repository;

pub use in_memory::InMemoryCredentialRepository;
pub use postgres_repository::PostgresCredentialRepository;
