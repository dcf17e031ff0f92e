//! Statement ingest: raw extracted records to insert-ready lines.
//!
//! # Responsibility
//! - Parse the JSON array produced by statement extraction.
//! - Coerce loosely typed fields into `NewTransaction` values.
//! - Compute the content hash and drop lines already stored.
//!
//! # Invariants
//! - Unparseable field values become `None`; they never fail a whole batch.
//! - Hashes depend only on transaction date, description and amount.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod hash;
mod normalize;

pub use hash::{partition_new, transaction_hash, PartitionedBatch};
pub use normalize::{normalize_record, parse_statement_json};

pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug)]
pub enum IngestError {
    /// Payload is not valid JSON.
    MalformedJson(serde_json::Error),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedJson(err) => write!(f, "statement payload is not valid JSON: {err}"),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedJson(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedJson(value)
    }
}
