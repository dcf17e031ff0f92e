//! Field coercion for extracted statement records.

use super::hash::transaction_hash;
use super::IngestResult;
use crate::model::transaction::{Cents, NewTransaction, TransactionHash};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("valid code fence regex")
});

const DATE_FORMATS: [&str; 3] = ["%m-%d-%Y", "%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const TRUTHY: [&str; 5] = ["true", "1", "t", "y", "yes"];

/// Parses an extracted JSON array into insert-ready lines.
///
/// A surrounding Markdown code fence is ignored. Empty input, a non-array
/// document, or an empty array all yield an empty vec. Array elements that
/// are not objects are skipped.
///
/// # Errors
/// - `IngestError::MalformedJson` when the payload is not JSON at all.
pub fn parse_statement_json(text: &str) -> IngestResult<Vec<NewTransaction>> {
    let payload = strip_code_fence(text);
    if payload.is_empty() {
        return Ok(Vec::new());
    }

    let document: Value = serde_json::from_str(payload)?;
    let Value::Array(items) = document else {
        debug!("event=ingest_parse module=ingest status=ok reason=not_an_array records=0");
        return Ok(Vec::new());
    };

    let total = items.len();
    let transactions: Vec<NewTransaction> = items
        .iter()
        .filter_map(Value::as_object)
        .map(normalize_record)
        .collect();

    info!(
        "event=ingest_parse module=ingest status=ok records={} skipped_non_objects={}",
        transactions.len(),
        total - transactions.len()
    );
    Ok(transactions)
}

/// Coerces one extracted object into a hashed `NewTransaction`.
///
/// Keys are matched after trimming whitespace.
pub fn normalize_record(record: &Map<String, Value>) -> NewTransaction {
    let mut entry = NewTransaction::with_hash(TransactionHash::new(""));

    entry.customer_id = text_field(record, "customer_id");
    entry.f_name = text_field(record, "f_name");
    entry.l_name = text_field(record, "l_name");
    entry.address = text_field(record, "address");
    entry.transaction_date = date_field(record, "transaction_date");
    entry.posting_date = date_field(record, "posting_date");
    entry.activity_description = text_field(record, "activity_description");
    entry.category = text_field(record, "category");
    entry.sub_category = text_field(record, "sub_category");
    entry.amount_spent = amount_field(record, "amount_spent");
    entry.credit_limit = amount_field(record, "credit_limit");
    entry.available_credit = amount_field(record, "available_credit");
    entry.is_subscription = flag_field(record, "is_subscription");
    entry.derive_calendar_fields();

    entry.transaction_hash = transaction_hash(&entry);
    entry
}

fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE_RE.captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}

fn field<'a>(record: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    record.get(name).or_else(|| {
        record
            .iter()
            .find(|(key, _)| key.trim() == name)
            .map(|(_, value)| value)
    })
}

fn text_field(record: &Map<String, Value>, name: &str) -> Option<String> {
    let text = match field(record, name)? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn date_field(record: &Map<String, Value>, name: &str) -> Option<NaiveDate> {
    let text = text_field(record, name)?;
    parse_date(&text)
}

fn amount_field(record: &Map<String, Value>, name: &str) -> Option<Cents> {
    match field(record, name)? {
        Value::Number(number) => number.as_f64().and_then(Cents::from_decimal),
        Value::String(text) => Cents::parse(text),
        _ => None,
    }
}

fn flag_field(record: &Map<String, Value>, name: &str) -> bool {
    let text = match field(record, name) {
        Some(Value::Bool(flag)) => return *flag,
        Some(Value::String(text)) => text.trim().to_lowercase(),
        Some(Value::Number(number)) => number.to_string(),
        _ => return false,
    };
    TRUTHY.contains(&text.as_str())
}

/// Parses the date layouts seen in extracted statements.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
}
