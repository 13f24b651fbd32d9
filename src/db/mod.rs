//! Relational persistence: connection manager plus the generic repository.

pub mod error;
pub mod pool;
pub mod repo;

pub use error::{RepoError, RepoResult};
pub use pool::ConnectionManager;
pub use repo::{present_fields, ChildEntity, Entity, FieldValue, Record, Repository};

#[cfg(test)]
mod live_tests;
