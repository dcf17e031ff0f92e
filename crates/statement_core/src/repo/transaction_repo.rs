//! Transaction repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Bulk-load parsed statement lines for one user.
//! - Read a user's lines back, optionally filtered by period or category.
//!
//! # Invariants
//! - A batch is all-or-nothing: one transaction, one prepared statement.
//! - Lines whose `(UserID, transaction_hash)` already exists are skipped by
//!   the uniqueness constraint and reported, never treated as errors.
//! - Dates are stored as ISO `YYYY-MM-DD` text and money as integer cents.

use crate::model::transaction::{Cents, NewTransaction, TransactionHash, TransactionRecord};
use crate::model::user::UserId;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::time::Instant;

const DATE_FORMAT: &str = "%Y-%m-%d";

const TRANSACTION_SELECT_SQL: &str = "SELECT
    TransactionID,
    UserID,
    transaction_hash,
    customer_id,
    f_name,
    l_name,
    address,
    transaction_date,
    posting_date,
    activity_description,
    category,
    sub_category,
    amount_spent,
    credit_limit,
    available_credit,
    is_subscription,
    month,
    day,
    month_name,
    day_of_week,
    year
FROM Transactions";

const TRANSACTION_INSERT_SQL: &str = "INSERT OR IGNORE INTO Transactions (
    UserID,
    transaction_hash,
    customer_id,
    f_name,
    l_name,
    address,
    transaction_date,
    posting_date,
    activity_description,
    category,
    sub_category,
    amount_spent,
    credit_limit,
    available_credit,
    is_subscription,
    month,
    day,
    month_name,
    day_of_week,
    year
) VALUES (
    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
    ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
);";

/// Outcome of one bulk insert call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkInsertReport {
    pub inserted: usize,
    /// Lines dropped by the `(UserID, transaction_hash)` constraint.
    pub skipped_duplicates: usize,
}

/// Query options for listing a user's transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionListQuery {
    pub user_id: UserId,
    pub year: Option<i32>,
    /// Calendar month, `1..=12`.
    pub month: Option<u32>,
    /// Case-insensitive exact category match.
    pub category: Option<String>,
}

impl TransactionListQuery {
    /// All transactions of one user.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            year: None,
            month: None,
            category: None,
        }
    }
}

/// Repository interface for statement transactions.
pub trait TransactionRepository {
    /// Inserts all lines for `user_id` in one transaction.
    fn bulk_insert_transactions(
        &mut self,
        user_id: UserId,
        transactions: &[NewTransaction],
    ) -> RepoResult<BulkInsertReport>;
    /// Returns every stored line of `user_id`, oldest first.
    fn list_user_transactions(&self, user_id: UserId) -> RepoResult<Vec<TransactionRecord>>;
    fn list_transactions(
        &self,
        query: &TransactionListQuery,
    ) -> RepoResult<Vec<TransactionRecord>>;
    /// Returns the content hashes already stored for `user_id`.
    fn existing_hashes(&self, user_id: UserId) -> RepoResult<HashSet<TransactionHash>>;
}

/// SQLite-backed transaction repository.
pub struct SqliteTransactionRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTransactionRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl TransactionRepository for SqliteTransactionRepository<'_> {
    fn bulk_insert_transactions(
        &mut self,
        user_id: UserId,
        transactions: &[NewTransaction],
    ) -> RepoResult<BulkInsertReport> {
        if transactions.is_empty() {
            info!(
                "event=bulk_insert module=repo status=ok reason=no_new_transactions user_id={}",
                user_id
            );
            return Ok(BulkInsertReport::default());
        }

        let started_at = Instant::now();
        match insert_batch(self.conn, user_id, transactions) {
            Ok(report) => {
                info!(
                    "event=bulk_insert module=repo status=ok user_id={} rows={} inserted={} skipped_duplicates={} duration_ms={}",
                    user_id,
                    transactions.len(),
                    report.inserted,
                    report.skipped_duplicates,
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=bulk_insert module=repo status=error user_id={} rows={} duration_ms={} error_code={} error={}",
                    user_id,
                    transactions.len(),
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn list_user_transactions(&self, user_id: UserId) -> RepoResult<Vec<TransactionRecord>> {
        self.list_transactions(&TransactionListQuery::for_user(user_id))
    }

    fn list_transactions(
        &self,
        query: &TransactionListQuery,
    ) -> RepoResult<Vec<TransactionRecord>> {
        let mut sql = format!("{TRANSACTION_SELECT_SQL} WHERE UserID = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(query.user_id)];

        if let Some(year) = query.year {
            sql.push_str(" AND year = ?");
            bind_values.push(Value::Integer(i64::from(year)));
        }

        if let Some(month) = query.month {
            sql.push_str(" AND month = ?");
            bind_values.push(Value::Integer(i64::from(month)));
        }

        if let Some(category) = query.category.as_deref() {
            sql.push_str(" AND category = ? COLLATE NOCASE");
            bind_values.push(Value::Text(category.trim().to_string()));
        }

        sql.push_str(" ORDER BY transaction_date IS NULL, transaction_date ASC, TransactionID ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_transaction_row(row)?);
        }

        Ok(records)
    }

    fn existing_hashes(&self, user_id: UserId) -> RepoResult<HashSet<TransactionHash>> {
        let mut stmt = self
            .conn
            .prepare("SELECT transaction_hash FROM Transactions WHERE UserID = ?1;")?;
        let hashes = stmt
            .query_map([user_id], |row| row.get::<_, String>(0))?
            .map(|hash| hash.map(TransactionHash::new))
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(hashes)
    }
}

fn insert_batch(
    conn: &mut Connection,
    user_id: UserId,
    transactions: &[NewTransaction],
) -> RepoResult<BulkInsertReport> {
    let tx = conn.transaction()?;

    let user_exists = tx
        .query_row("SELECT 1 FROM Users WHERE UserID = ?1;", [user_id], |_| Ok(()))
        .optional()?
        .is_some();
    if !user_exists {
        return Err(RepoError::UserNotFound(user_id));
    }

    let mut report = BulkInsertReport::default();
    {
        let mut stmt = tx.prepare(TRANSACTION_INSERT_SQL)?;
        for entry in transactions {
            let changed = stmt.execute(params![
                user_id,
                entry.transaction_hash.as_str(),
                entry.customer_id.as_deref(),
                entry.f_name.as_deref(),
                entry.l_name.as_deref(),
                entry.address.as_deref(),
                entry.transaction_date.map(date_to_db),
                entry.posting_date.map(date_to_db),
                entry.activity_description.as_deref(),
                entry.category.as_deref(),
                entry.sub_category.as_deref(),
                entry.amount_spent.map(Cents::as_i64),
                entry.credit_limit.map(Cents::as_i64),
                entry.available_credit.map(Cents::as_i64),
                entry.is_subscription,
                entry.month,
                entry.day,
                entry.month_name.as_deref(),
                entry.day_of_week.as_deref(),
                entry.year,
            ])?;

            if changed == 0 {
                report.skipped_duplicates += 1;
            } else {
                report.inserted += 1;
            }
        }
    }

    tx.commit()?;
    Ok(report)
}

fn parse_transaction_row(row: &Row<'_>) -> RepoResult<TransactionRecord> {
    let is_subscription = match row.get::<_, i64>("is_subscription")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_subscription value `{other}` in Transactions.is_subscription"
            )));
        }
    };

    let entry = NewTransaction {
        transaction_hash: TransactionHash::new(row.get::<_, String>("transaction_hash")?),
        customer_id: row.get("customer_id")?,
        f_name: row.get("f_name")?,
        l_name: row.get("l_name")?,
        address: row.get("address")?,
        transaction_date: parse_date_column(row, "transaction_date")?,
        posting_date: parse_date_column(row, "posting_date")?,
        activity_description: row.get("activity_description")?,
        category: row.get("category")?,
        sub_category: row.get("sub_category")?,
        amount_spent: row.get::<_, Option<i64>>("amount_spent")?.map(Cents),
        credit_limit: row.get::<_, Option<i64>>("credit_limit")?.map(Cents),
        available_credit: row.get::<_, Option<i64>>("available_credit")?.map(Cents),
        is_subscription,
        month: row.get("month")?,
        day: row.get("day")?,
        month_name: row.get("month_name")?,
        day_of_week: row.get("day_of_week")?,
        year: row.get("year")?,
    };

    Ok(TransactionRecord {
        transaction_id: row.get("TransactionID")?,
        user_id: row.get("UserID")?,
        entry,
    })
}

fn parse_date_column(row: &Row<'_>, column: &str) -> RepoResult<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid date `{text}` in Transactions.{column}"
                ))
            }),
        None => Ok(None),
    }
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
