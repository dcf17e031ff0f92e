//! Domain records persisted by the statement store.
//!
//! # Responsibility
//! - Define the user and transaction shapes shared by repo/ingest/service.
//! - Keep money and content-hash values behind dedicated newtypes.
//!
//! # Invariants
//! - Users are identified by the database-assigned `UserId`.
//! - A transaction is unique per user by its `TransactionHash`.

pub mod transaction;
pub mod user;
