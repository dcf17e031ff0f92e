use statement_core::{
    open_db_in_memory, GoogleProfile, RepoError, ServiceError, StatementService,
    TransactionListQuery,
};

const STATEMENT: &str = r#"```json
[
  {
    "customer_id": "alex_juma",
    "f_name": "Alex",
    "l_name": "Juma",
    "transaction_date": "01-05-2024",
    "posting_date": "01-06-2024",
    "activity_description": "UBER",
    "category": "Living Expenses",
    "sub_category": "Transportation",
    "amount_spent": 23.5,
    "credit_limit": "5,000.00",
    "available_credit": 4976.5,
    "is_subscription": false
  },
  {
    "transaction_date": "01-07-2024",
    "activity_description": "SPOTIFY",
    "category": "Subscriptions",
    "amount_spent": "10.99",
    "is_subscription": "true"
  },
  {
    "transaction_date": "01-07-2024",
    "activity_description": " spotify ",
    "amount_spent": 10.99
  }
]
```"#;

fn sign_in(service: &mut StatementService<'_>) -> i64 {
    service
        .sign_in(&GoogleProfile::new(
            "alex@example.com",
            Some("Alex Juma".to_string()),
            None,
        ))
        .unwrap()
}

#[test]
fn import_statement_stores_new_lines_once() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = StatementService::new(&mut conn);
    let user_id = sign_in(&mut service);

    let first = service.import_statement(user_id, STATEMENT).unwrap();
    assert_eq!(first.parsed, 3);
    assert_eq!(first.inserted, 2);
    assert_eq!(first.skipped_duplicates, 1);

    let second = service.import_statement(user_id, STATEMENT).unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped_duplicates, 3);

    let stored = service.load_transactions(user_id);
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].entry.customer_id.as_deref(), Some("alex_juma"));
    assert_eq!(stored[0].entry.month_name.as_deref(), Some("January"));
    assert!(stored[1].entry.is_subscription);
}

#[test]
fn sign_in_is_stable_across_sessions() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = StatementService::new(&mut conn);

    let first = sign_in(&mut service);
    let second = sign_in(&mut service);
    assert_eq!(first, second);

    let user = service.find_user_by_email("alex@example.com").unwrap().unwrap();
    assert_eq!(user.user_id, first);
    assert_eq!(user.display_name.as_deref(), Some("Alex Juma"));
}

#[test]
fn malformed_payload_is_an_ingest_error() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = StatementService::new(&mut conn);
    let user_id = sign_in(&mut service);

    let err = service.import_statement(user_id, "[{ not json").unwrap_err();
    assert!(matches!(err, ServiceError::Ingest(_)));
    assert!(service.load_transactions(user_id).is_empty());
}

#[test]
fn empty_payload_imports_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = StatementService::new(&mut conn);
    let user_id = sign_in(&mut service);

    let summary = service.import_statement(user_id, "[]").unwrap();
    assert_eq!(summary.parsed, 0);
    assert_eq!(summary.inserted, 0);
}

#[test]
fn import_for_unknown_user_fails_without_writes() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = StatementService::new(&mut conn);

    let err = service.import_statement(9, STATEMENT).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(_)));
    assert!(service.load_transactions(9).is_empty());
}

#[test]
fn read_failure_degrades_to_empty_result() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = {
        let mut service = StatementService::new(&mut conn);
        let user_id = sign_in(&mut service);
        service.import_statement(user_id, STATEMENT).unwrap();
        user_id
    };
    conn.execute_batch("DROP TABLE Transactions;").unwrap();

    let mut service = StatementService::new(&mut conn);
    assert!(service.load_transactions(user_id).is_empty());
}

#[test]
fn user_lookup_failure_is_reported() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE Users;").unwrap();

    let mut service = StatementService::new(&mut conn);
    let err = service.find_user_by_email("alex@example.com").unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::Db(_))));
}

#[test]
fn import_fails_when_stored_hashes_cannot_be_read() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = {
        let mut service = StatementService::new(&mut conn);
        sign_in(&mut service)
    };
    conn.execute_batch("DROP TABLE Transactions;").unwrap();

    let mut service = StatementService::new(&mut conn);
    let err = service.import_statement(user_id, STATEMENT).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::Db(_))));
}

#[test]
fn filter_transactions_by_category() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = StatementService::new(&mut conn);
    let user_id = sign_in(&mut service);
    service.import_statement(user_id, STATEMENT).unwrap();

    let query = TransactionListQuery {
        category: Some("subscriptions".to_string()),
        ..TransactionListQuery::for_user(user_id)
    };
    let rows = service.filter_transactions(&query);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entry.activity_description.as_deref(), Some("SPOTIFY"));
}
