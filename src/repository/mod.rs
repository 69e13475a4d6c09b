mod embedded;
#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::Repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{LogEntry, NewNote, Note, NoteChanges, User, VisibleNote};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Postgres(tokio_postgres::Error),

    #[error("connection pool: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("connection pool setup: {0}")]
    PoolBuild(#[from] deadpool_postgres::BuildError),

    #[error("migration failed: {0}")]
    Migration(#[from] refinery::Error),

    /// Raised by the in-memory store when told to fail.
    #[cfg(test)]
    #[error("{0} unavailable")]
    Unavailable(&'static str),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        if e.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION) {
            Self::UniqueViolation(e.to_string())
        } else {
            Self::Postgres(e)
        }
    }
}

/// Persistence for users, notes, collaborators and request logs.
///
/// Every method is a single statement; callers never get multi-statement
/// atomicity.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a user and returns its id. A taken username surfaces as
    /// [`StoreError::UniqueViolation`].
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<i64, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn insert_note(&self, note: NewNote) -> Result<i64, StoreError>;

    async fn get_note(&self, id: i64) -> Result<Option<Note>, StoreError>;

    /// Notes owned by `user_id` or shared with them, newest first.
    async fn visible_notes(&self, user_id: i64) -> Result<Vec<VisibleNote>, StoreError>;

    /// Applies `changes` and stamps `updated_at`. Returns `false` if no row matched.
    async fn update_note(
        &self,
        id: i64,
        changes: NoteChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError>;

    /// Replaces the share token of a note. Returns `false` if no row matched.
    async fn set_share_token(&self, note_id: i64, token: &str) -> Result<bool, StoreError>;

    async fn note_id_by_share_token(&self, token: &str) -> Result<Option<i64>, StoreError>;

    /// Records a collaborator; an existing `(note, user)` pair is left as is.
    async fn add_collaborator(
        &self,
        note_id: i64,
        user_id: i64,
        can_edit: bool,
    ) -> Result<(), StoreError>;

    /// The `can_edit` flag of `user_id` on `note_id`, if they collaborate on it.
    async fn collaborator_can_edit(
        &self,
        note_id: i64,
        user_id: i64,
    ) -> Result<Option<bool>, StoreError>;

    async fn insert_log(&self, entry: LogEntry) -> Result<(), StoreError>;
}
