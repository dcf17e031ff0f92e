//! Statement use-case service.
//!
//! # Invariants
//! - Imports never insert a line whose hash is already stored for the user.
//! - Read helpers never return an error; failures are logged and an empty
//!   vec is returned so display code keeps working.

use crate::ingest::{parse_statement_json, partition_new, IngestError};
use crate::model::transaction::{NewTransaction, TransactionRecord};
use crate::model::user::{GoogleProfile, User, UserId};
use crate::repo::transaction_repo::{
    SqliteTransactionRepository, TransactionListQuery, TransactionRepository,
};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoError;
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for statement use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Ingest(IngestError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Ingest(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Ingest(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<IngestError> for ServiceError {
    fn from(value: IngestError) -> Self {
        Self::Ingest(value)
    }
}

/// Counts reported by one statement import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Lines recovered from the payload.
    pub parsed: usize,
    pub inserted: usize,
    /// Lines already stored, repeated in the payload, or rejected by the
    /// uniqueness constraint.
    pub skipped_duplicates: usize,
}

/// Use-case facade bound to one connection.
pub struct StatementService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> StatementService<'conn> {
    /// Creates a service over a connection with tables provisioned.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Upserts the signed-in profile and returns its id.
    pub fn sign_in(&mut self, profile: &GoogleProfile) -> ServiceResult<UserId> {
        let user_id = SqliteUserRepository::new(self.conn).upsert_google_user(profile)?;
        Ok(user_id)
    }

    pub fn find_user_by_email(&mut self, email: &str) -> ServiceResult<Option<User>> {
        SqliteUserRepository::new(self.conn)
            .get_user_by_email(email)
            .map_err(|err| {
                error!(
                    "event=user_lookup module=service status=error error_code={} error={}",
                    err.code(),
                    err
                );
                err.into()
            })
    }

    /// Parses an extracted statement payload and stores its new lines.
    ///
    /// # Errors
    /// - `ServiceError::Ingest` when the payload is not JSON.
    /// - `ServiceError::Repo` when storage fails; nothing is committed then.
    pub fn import_statement(
        &mut self,
        user_id: UserId,
        payload: &str,
    ) -> ServiceResult<ImportSummary> {
        let transactions = parse_statement_json(payload).map_err(|err| {
            error!(
                "event=statement_import module=service status=error user_id={} error_code=malformed_payload error={}",
                user_id, err
            );
            err
        })?;
        self.import_transactions(user_id, transactions)
    }

    /// Stores already-normalized lines, skipping known hashes.
    pub fn import_transactions(
        &mut self,
        user_id: UserId,
        transactions: Vec<NewTransaction>,
    ) -> ServiceResult<ImportSummary> {
        let parsed = transactions.len();
        let mut repo = SqliteTransactionRepository::new(self.conn);

        let existing = repo.existing_hashes(user_id).map_err(|err| {
            error!(
                "event=statement_import module=service status=error user_id={} stage=existing_hashes error_code={} error={}",
                user_id,
                err.code(),
                err
            );
            err
        })?;
        let batch = partition_new(transactions, &existing);
        let report = repo.bulk_insert_transactions(user_id, &batch.fresh)?;

        let summary = ImportSummary {
            parsed,
            inserted: report.inserted,
            skipped_duplicates: batch.duplicates + report.skipped_duplicates,
        };
        info!(
            "event=statement_import module=service status=ok user_id={} parsed={} inserted={} skipped_duplicates={}",
            user_id, summary.parsed, summary.inserted, summary.skipped_duplicates
        );
        Ok(summary)
    }

    /// Returns all of a user's lines, or an empty vec on failure.
    pub fn load_transactions(&mut self, user_id: UserId) -> Vec<TransactionRecord> {
        self.filter_transactions(&TransactionListQuery::for_user(user_id))
    }

    /// Returns the lines matching `query`, or an empty vec on failure.
    pub fn filter_transactions(&mut self, query: &TransactionListQuery) -> Vec<TransactionRecord> {
        match SqliteTransactionRepository::new(self.conn).list_transactions(query) {
            Ok(records) => records,
            Err(err) => {
                error!(
                    "event=transactions_read module=service status=error user_id={} error_code={} error={}",
                    query.user_id,
                    err.code(),
                    err
                );
                Vec::new()
            }
        }
    }
}
