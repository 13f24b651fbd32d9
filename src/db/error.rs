use std::time::Duration;

use sqlx::error::ErrorKind;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure of a repository call.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The store could not be reached: pool exhausted, closed, network or auth trouble.
    #[error("connection error: {0}")]
    Connection(String),

    /// The statement reached the store and failed there.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("field `{0}` cannot be updated")]
    InvalidField(String),

    #[error("no updatable fields supplied")]
    EmptyPatch,
}

impl RepoError {
    /// True when an insert or update referenced a parent row that does not exist.
    pub fn violates_foreign_key(&self) -> bool {
        match self {
            RepoError::Database(sqlx::Error::Database(db)) => {
                matches!(db.kind(), ErrorKind::ForeignKeyViolation)
            }
            _ => false,
        }
    }

    /// True for errors caused by the caller's input rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RepoError::InvalidField(_) | RepoError::EmptyPatch)
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => RepoError::Connection(e.to_string()),
            other => RepoError::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_connection_errors() {
        assert!(matches!(
            RepoError::from(sqlx::Error::PoolTimedOut),
            RepoError::Connection(_)
        ));
        assert!(matches!(
            RepoError::from(sqlx::Error::PoolClosed),
            RepoError::Connection(_)
        ));
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            RepoError::from(sqlx::Error::Io(io)),
            RepoError::Connection(_)
        ));
    }

    #[test]
    fn query_failures_are_database_errors() {
        let err = RepoError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepoError::Database(_)));
        assert!(!err.violates_foreign_key());
        assert!(!err.is_client_error());
    }

    #[test]
    fn patch_errors_are_client_errors() {
        assert!(RepoError::EmptyPatch.is_client_error());
        assert!(RepoError::InvalidField("id".into()).is_client_error());
        assert_eq!(
            RepoError::InvalidField("created_at".into()).to_string(),
            "field `created_at` cannot be updated"
        );
    }
}
