//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Upsert signed-in profiles keyed by `GoogleEmail`.
//! - Look users up by id or email.
//!
//! # Invariants
//! - The select-then-insert/update upsert runs inside one transaction.
//! - Emails are matched exactly; no normalization happens here.

use crate::model::user::{GoogleProfile, User, UserId};
use crate::repo::RepoResult;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    UserID,
    GoogleEmail,
    DisplayName,
    PictureURL
FROM Users";

/// Repository interface for user identity rows.
pub trait UserRepository {
    /// Inserts or refreshes a profile and returns its `UserId`.
    fn upsert_google_user(&mut self, profile: &GoogleProfile) -> RepoResult<UserId>;
    fn get_user(&self, user_id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

#[derive(Debug, Clone, Copy)]
enum UpsertAction {
    Inserted,
    Updated,
}

impl UpsertAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "insert",
            Self::Updated => "update",
        }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn upsert_google_user(&mut self, profile: &GoogleProfile) -> RepoResult<UserId> {
        match upsert_in_tx(self.conn, profile) {
            Ok((user_id, action)) => {
                info!(
                    "event=user_upsert module=repo status=ok action={} user_id={}",
                    action.as_str(),
                    user_id
                );
                Ok(user_id)
            }
            Err(err) => {
                error!(
                    "event=user_upsert module=repo status=error error_code={} error={}",
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn get_user(&self, user_id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE UserID = ?1;"),
                [user_id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE GoogleEmail = ?1;"),
                [email],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }
}

fn upsert_in_tx(
    conn: &mut Connection,
    profile: &GoogleProfile,
) -> RepoResult<(UserId, UpsertAction)> {
    let tx = conn.transaction()?;

    let existing: Option<UserId> = tx
        .query_row(
            "SELECT UserID FROM Users WHERE GoogleEmail = ?1;",
            [profile.email.as_str()],
            |row| row.get(0),
        )
        .optional()?;

    let outcome = match existing {
        Some(user_id) => {
            tx.execute(
                "UPDATE Users
                 SET DisplayName = ?1, PictureURL = ?2
                 WHERE GoogleEmail = ?3;",
                params![
                    profile.display_name.as_deref(),
                    profile.picture_url.as_deref(),
                    profile.email.as_str(),
                ],
            )?;
            (user_id, UpsertAction::Updated)
        }
        None => {
            tx.execute(
                "INSERT INTO Users (GoogleEmail, DisplayName, PictureURL)
                 VALUES (?1, ?2, ?3);",
                params![
                    profile.email.as_str(),
                    profile.display_name.as_deref(),
                    profile.picture_url.as_deref(),
                ],
            )?;
            (tx.last_insert_rowid(), UpsertAction::Inserted)
        }
    };

    tx.commit()?;
    Ok(outcome)
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get("UserID")?,
        google_email: row.get("GoogleEmail")?,
        display_name: row.get("DisplayName")?,
        picture_url: row.get("PictureURL")?,
    })
}
