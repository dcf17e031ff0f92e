//! Storage layer for bank-statement analysis.
//!
//! Provisions the `Users` and `Transactions` tables, upserts signed-in
//! profiles, bulk-loads hashed statement lines and reads them back.

pub mod config;
pub mod db;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{load_secrets, resolve_secrets_path, DatabaseConfig, LoggingConfig, Secrets};
pub use db::{connect_to_db, create_tables, open_db, open_db_in_memory, DbError, DbResult};
pub use ingest::{normalize_record, parse_statement_json, transaction_hash, IngestError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::transaction::{
    Cents, NewTransaction, TransactionHash, TransactionId, TransactionRecord,
};
pub use model::user::{GoogleProfile, User, UserId};
pub use repo::transaction_repo::{
    BulkInsertReport, SqliteTransactionRepository, TransactionListQuery, TransactionRepository,
};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::statement_service::{
    ImportSummary, ServiceError, ServiceResult, StatementService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
