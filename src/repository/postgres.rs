use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Manager, Pool};
use tokio_postgres::{NoTls, Row};

use super::{Store, StoreError, embedded::migrations};
use crate::models::{LogEntry, NewNote, Note, NoteChanges, NoteKind, User, VisibleNote};

const NOTE_COLUMNS: &str = "id, user_id, date, type, content, status, share_token, created_at, updated_at";

/// PostgreSQL-backed [`Store`]. Connections come from a pool, so a dropped
/// connection is replaced on the next checkout.
#[derive(Clone)]
pub struct Repository {
    pool: Pool,
}

impl Repository {
    /// Builds the pool. No connection is opened until the first checkout.
    pub fn new(database_dsn: &str, max_connections: usize) -> Result<Self, StoreError> {
        let config: tokio_postgres::Config = database_dsn.parse()?;
        let pool = Pool::builder(Manager::new(config, NoTls))
            .max_size(max_connections)
            .build()?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        let mut client = self.pool.get().await?;
        let migrations_report = migrations::runner().run_async(&mut **client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }
}

fn note_from_row(row: &Row) -> Note {
    Note {
        id: row.get("id"),
        owner_id: row.get("user_id"),
        date: row.get("date"),
        kind: NoteKind::normalize(row.get("type")),
        content: row.get("content"),
        status: row.get("status"),
        share_token: row.get("share_token"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Store for Repository {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<i64, StoreError> {
        let row = self
            .pool
            .get()
            .await?
            .query_one(
                "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id",
                &[&username, &password_hash],
            )
            .await?;

        Ok(row.get("id"))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = self
            .pool
            .get()
            .await?
            .query_opt(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
                &[&username],
            )
            .await?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        }))
    }

    async fn insert_note(&self, note: NewNote) -> Result<i64, StoreError> {
        let row = self
            .pool
            .get()
            .await?
            .query_one(
                "INSERT INTO notes (user_id, date, type, content, status) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
                &[
                    &note.owner_id,
                    &note.date,
                    &note.kind.as_str(),
                    &note.content,
                    &note.status,
                ],
            )
            .await?;

        Ok(row.get("id"))
    }

    async fn get_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        let row = self
            .pool
            .get()
            .await?
            .query_opt(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1"),
                &[&id],
            )
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn visible_notes(&self, user_id: i64) -> Result<Vec<VisibleNote>, StoreError> {
        let rows = self
            .pool
            .get()
            .await?
            .query(
                "SELECT n.id, n.user_id, n.date, n.type, n.content, n.status, n.share_token, \
                        n.created_at, n.updated_at, \
                        COALESCE(nc.can_edit, FALSE) AS can_edit \
                 FROM notes n \
                 LEFT JOIN note_collaborators nc \
                        ON n.id = nc.note_id AND nc.user_id = $1 \
                 WHERE n.user_id = $1 OR nc.user_id = $1 \
                 ORDER BY n.created_at DESC, n.id DESC",
                &[&user_id],
            )
            .await?;

        let mut vec: Vec<VisibleNote> = Vec::with_capacity(rows.len());

        for row in rows {
            vec.push(VisibleNote {
                note: note_from_row(&row),
                can_edit: row.get("can_edit"),
            });
        }

        Ok(vec)
    }

    async fn update_note(
        &self,
        id: i64,
        changes: NoteChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let kind = changes.kind.map(NoteKind::as_str);
        let rows = self
            .pool
            .get()
            .await?
            .execute(
                "UPDATE notes SET \
                    date = COALESCE($1, date), \
                    type = COALESCE($2, type), \
                    content = COALESCE($3, content), \
                    status = COALESCE($4, status), \
                    updated_at = $5 \
                 WHERE id = $6",
                &[
                    &changes.date,
                    &kind,
                    &changes.content,
                    &changes.status,
                    &updated_at,
                    &id,
                ],
            )
            .await?;

        Ok(rows == 1)
    }

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        let rows = self
            .pool
            .get()
            .await?
            .execute("DELETE FROM notes WHERE id = $1", &[&id])
            .await?;

        Ok(rows == 1)
    }

    async fn set_share_token(&self, note_id: i64, token: &str) -> Result<bool, StoreError> {
        let rows = self
            .pool
            .get()
            .await?
            .execute(
                "UPDATE notes SET share_token = $1 WHERE id = $2",
                &[&token, &note_id],
            )
            .await?;

        Ok(rows == 1)
    }

    async fn note_id_by_share_token(&self, token: &str) -> Result<Option<i64>, StoreError> {
        let row = self
            .pool
            .get()
            .await?
            .query_opt("SELECT id FROM notes WHERE share_token = $1", &[&token])
            .await?;

        Ok(row.map(|row| row.get("id")))
    }

    async fn add_collaborator(
        &self,
        note_id: i64,
        user_id: i64,
        can_edit: bool,
    ) -> Result<(), StoreError> {
        self.pool
            .get()
            .await?
            .execute(
                "INSERT INTO note_collaborators (note_id, user_id, can_edit) \
                 VALUES ($1, $2, $3) ON CONFLICT (note_id, user_id) DO NOTHING",
                &[&note_id, &user_id, &can_edit],
            )
            .await?;

        Ok(())
    }

    async fn collaborator_can_edit(
        &self,
        note_id: i64,
        user_id: i64,
    ) -> Result<Option<bool>, StoreError> {
        let row = self
            .pool
            .get()
            .await?
            .query_opt(
                "SELECT can_edit FROM note_collaborators WHERE note_id = $1 AND user_id = $2",
                &[&note_id, &user_id],
            )
            .await?;

        Ok(row.map(|row| row.get("can_edit")))
    }

    async fn insert_log(&self, entry: LogEntry) -> Result<(), StoreError> {
        self.pool
            .get()
            .await?
            .execute(
                "INSERT INTO logs \
                    (datetime, method, endpoint, request_headers, payload, response_body, status_code) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    &entry.datetime,
                    &entry.method,
                    &entry.endpoint,
                    &entry.request_headers,
                    &entry.payload,
                    &entry.response_body,
                    &entry.status_code,
                ],
            )
            .await?;

        Ok(())
    }
}
