//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users and transactions.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every write runs inside one SQLite transaction; an error drops the
//!   transaction, which rolls it back.
//! - Read paths reject malformed persisted values instead of masking them.

use crate::db::DbError;
use crate::model::user::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod transaction_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user and transaction persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    UserNotFound(UserId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UserNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    /// Stable short code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(DbError::Sqlite(_)) => "db_error",
            Self::Db(DbError::UnsupportedSchemaVersion { .. }) => "schema_too_new",
            Self::UserNotFound(_) => "user_not_found",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}
