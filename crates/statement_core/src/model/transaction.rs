//! Statement transaction model.
//!
//! # Responsibility
//! - Describe one parsed statement line (`NewTransaction`) and its stored
//!   form (`TransactionRecord`).
//! - Provide exact two-decimal money (`Cents`) and the dedup key
//!   (`TransactionHash`).
//!
//! # Invariants
//! - Money is stored as integer cents; no floating point reaches SQL.
//! - Calendar fields (`year`, `month`, `day`, `month_name`, `day_of_week`)
//!   are derived from `transaction_date` only.

use crate::model::user::UserId;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Database identity of a `Transactions` row.
pub type TransactionId = i64;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Signed money amount in hundredths of the statement currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl Cents {
    /// Converts a decimal amount, rounding half away from zero to cents.
    ///
    /// Returns `None` for NaN, infinities and values outside `i64` cents.
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    /// Parses statement-style text such as `1,234.5`, `$12.00` or `-3`.
    pub fn parse(text: &str) -> Option<Self> {
        let cleaned: String = text
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '$' | ',' | ' '))
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        let value: f64 = cleaned.parse().ok()?;
        Self::from_decimal(value)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Opaque content hash identifying one statement line for a user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHash(String);

impl TransactionHash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TransactionHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One parsed statement line ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub transaction_hash: TransactionHash,
    pub customer_id: Option<String>,
    pub f_name: Option<String>,
    pub l_name: Option<String>,
    pub address: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub posting_date: Option<NaiveDate>,
    /// Merchant label as shown on the statement.
    pub activity_description: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    /// Positive for debits, negative for credits/returns.
    pub amount_spent: Option<Cents>,
    pub credit_limit: Option<Cents>,
    pub available_credit: Option<Cents>,
    pub is_subscription: bool,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub month_name: Option<String>,
    pub day_of_week: Option<String>,
    pub year: Option<i32>,
}

impl NewTransaction {
    /// Creates an empty line carrying only its content hash.
    pub fn with_hash(transaction_hash: TransactionHash) -> Self {
        Self {
            transaction_hash,
            customer_id: None,
            f_name: None,
            l_name: None,
            address: None,
            transaction_date: None,
            posting_date: None,
            activity_description: None,
            category: None,
            sub_category: None,
            amount_spent: None,
            credit_limit: None,
            available_credit: None,
            is_subscription: false,
            month: None,
            day: None,
            month_name: None,
            day_of_week: None,
            year: None,
        }
    }

    /// Recomputes calendar fields from `transaction_date`.
    ///
    /// Fields are cleared when the date is missing so they never disagree
    /// with it.
    pub fn derive_calendar_fields(&mut self) {
        match self.transaction_date {
            Some(date) => {
                self.year = Some(date.year());
                self.month = Some(date.month());
                self.day = Some(date.day());
                self.month_name = Some(month_name(date.month()).to_string());
                self.day_of_week = Some(date.format("%A").to_string());
            }
            None => {
                self.year = None;
                self.month = None;
                self.day = None;
                self.month_name = None;
                self.day_of_week = None;
            }
        }
    }
}

/// Stored `Transactions` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub entry: NewTransaction,
}

/// Returns the English month name for `month` in `1..=12`.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index as usize))
        .copied()
        .unwrap_or("")
}
