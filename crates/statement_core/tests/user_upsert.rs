use statement_core::{open_db_in_memory, GoogleProfile, SqliteUserRepository, UserRepository};

fn profile(email: &str, name: &str) -> GoogleProfile {
    GoogleProfile::new(
        email,
        Some(name.to_string()),
        Some(format!("https://example.com/{name}.png")),
    )
}

#[test]
fn upsert_inserts_new_user() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::new(&mut conn);

    let user_id = repo.upsert_google_user(&profile("ada@example.com", "Ada")).unwrap();

    let user = repo.get_user(user_id).unwrap().unwrap();
    assert_eq!(user.google_email, "ada@example.com");
    assert_eq!(user.display_name.as_deref(), Some("Ada"));
    assert_eq!(
        user.picture_url.as_deref(),
        Some("https://example.com/Ada.png")
    );
}

#[test]
fn upsert_updates_existing_user_and_keeps_id() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::new(&mut conn);

    let first = repo.upsert_google_user(&profile("ada@example.com", "Ada")).unwrap();
    let second = repo
        .upsert_google_user(&profile("ada@example.com", "Ada Lovelace"))
        .unwrap();

    assert_eq!(first, second);
    let user = repo.get_user_by_email("ada@example.com").unwrap().unwrap();
    assert_eq!(user.display_name.as_deref(), Some("Ada Lovelace"));
}

#[test]
fn upsert_can_clear_optional_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::new(&mut conn);

    repo.upsert_google_user(&profile("ada@example.com", "Ada")).unwrap();
    repo.upsert_google_user(&GoogleProfile::new("ada@example.com", None, None))
        .unwrap();

    let user = repo.get_user_by_email("ada@example.com").unwrap().unwrap();
    assert_eq!(user.display_name, None);
    assert_eq!(user.picture_url, None);
}

#[test]
fn distinct_emails_get_distinct_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::new(&mut conn);

    let ada = repo.upsert_google_user(&profile("ada@example.com", "Ada")).unwrap();
    let alan = repo.upsert_google_user(&profile("alan@example.com", "Alan")).unwrap();

    assert_ne!(ada, alan);
}

#[test]
fn lookups_return_none_for_unknown_users() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::new(&mut conn);

    assert!(repo.get_user(404).unwrap().is_none());
    assert!(repo.get_user_by_email("nobody@example.com").unwrap().is_none());
}

#[test]
fn upsert_failure_rolls_back() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE Transactions; DROP TABLE Users;")
        .unwrap();

    let mut repo = SqliteUserRepository::new(&mut conn);
    assert!(repo
        .upsert_google_user(&profile("ada@example.com", "Ada"))
        .is_err());
    drop(repo);

    assert!(conn.is_autocommit(), "failed upsert must not leave a transaction open");
}
