//! Content hashing and duplicate partitioning.

use crate::model::transaction::{NewTransaction, TransactionHash};
use std::collections::HashSet;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Lines of one batch split by whether they are already known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedBatch {
    pub fresh: Vec<NewTransaction>,
    pub duplicates: usize,
}

/// Computes the dedup key of a line.
///
/// Key text is `{date}-{description}-{amount}` with `no_date`, `no_desc`
/// and `no_amount` placeholders; the description is trimmed and lowercased.
pub fn transaction_hash(entry: &NewTransaction) -> TransactionHash {
    let key = dedup_key(entry);
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(key.as_bytes());
    TransactionHash::new(format!("{:016x}", hasher.finish()))
}

/// Keeps lines whose hash is neither in `existing` nor earlier in `batch`.
pub fn partition_new(
    batch: Vec<NewTransaction>,
    existing: &HashSet<TransactionHash>,
) -> PartitionedBatch {
    let mut seen: HashSet<TransactionHash> = HashSet::new();
    let mut partitioned = PartitionedBatch::default();

    for entry in batch {
        if existing.contains(&entry.transaction_hash)
            || !seen.insert(entry.transaction_hash.clone())
        {
            partitioned.duplicates += 1;
            continue;
        }
        partitioned.fresh.push(entry);
    }

    partitioned
}

fn dedup_key(entry: &NewTransaction) -> String {
    let date = entry
        .transaction_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "no_date".to_string());
    let description = entry
        .activity_description
        .as_deref()
        .map(|text| text.trim().to_lowercase())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "no_desc".to_string());
    let amount = entry
        .amount_spent
        .map(|amount| amount.to_string())
        .unwrap_or_else(|| "no_amount".to_string());

    format!("{date}-{description}-{amount}")
}
