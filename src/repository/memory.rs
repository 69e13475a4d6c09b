//! In-process [`Store`] used by the test suites.

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Store, StoreError};
use crate::models::{LogEntry, NewNote, Note, NoteChanges, User, VisibleNote};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collaborator {
    pub note_id: i64,
    pub user_id: i64,
    pub can_edit: bool,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    notes: Vec<Note>,
    collaborators: Vec<Collaborator>,
    logs: Vec<LogEntry>,
    next_user_id: i64,
    next_note_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_log_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `insert_log` fail.
    pub fn fail_log_writes(&self) {
        self.fail_log_writes.store(true, Ordering::SeqCst);
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.lock().logs.clone()
    }

    pub fn note_count(&self) -> usize {
        self.lock().notes.len()
    }

    pub fn collaborators(&self) -> Vec<Collaborator> {
        self.lock().collaborators.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<i64, StoreError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.username == username) {
            return Err(StoreError::UniqueViolation(format!(
                "username {username} already exists"
            )));
        }

        tables.next_user_id += 1;
        let id = tables.next_user_id;
        tables.users.push(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_note(&self, note: NewNote) -> Result<i64, StoreError> {
        let mut tables = self.lock();
        tables.next_note_id += 1;
        let id = tables.next_note_id;
        let now = Utc::now();
        tables.notes.push(Note {
            id,
            owner_id: note.owner_id,
            date: note.date,
            kind: note.kind,
            content: note.content,
            status: note.status,
            share_token: None,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn get_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        Ok(self.lock().notes.iter().find(|n| n.id == id).cloned())
    }

    async fn visible_notes(&self, user_id: i64) -> Result<Vec<VisibleNote>, StoreError> {
        let tables = self.lock();
        let mut visible: Vec<VisibleNote> = tables
            .notes
            .iter()
            .filter_map(|note| {
                let collaboration = tables
                    .collaborators
                    .iter()
                    .find(|c| c.note_id == note.id && c.user_id == user_id);
                if note.owner_id != user_id && collaboration.is_none() {
                    return None;
                }
                Some(VisibleNote {
                    note: note.clone(),
                    can_edit: collaboration.is_some_and(|c| c.can_edit),
                })
            })
            .collect();

        visible.sort_by(|a, b| {
            b.note
                .created_at
                .cmp(&a.note.created_at)
                .then(b.note.id.cmp(&a.note.id))
        });
        Ok(visible)
    }

    async fn update_note(
        &self,
        id: i64,
        changes: NoteChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.lock();
        let Some(note) = tables.notes.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };

        if let Some(date) = changes.date {
            note.date = Some(date);
        }
        if let Some(kind) = changes.kind {
            note.kind = kind;
        }
        if let Some(content) = changes.content {
            note.content = content;
        }
        if let Some(status) = changes.status {
            note.status = Some(status);
        }
        note.updated_at = updated_at;
        Ok(true)
    }

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.lock();
        let before = tables.notes.len();
        tables.notes.retain(|n| n.id != id);
        let deleted = tables.notes.len() != before;
        if deleted {
            tables.collaborators.retain(|c| c.note_id != id);
        }
        Ok(deleted)
    }

    async fn set_share_token(&self, note_id: i64, token: &str) -> Result<bool, StoreError> {
        let mut tables = self.lock();
        if tables
            .notes
            .iter()
            .any(|n| n.id != note_id && n.share_token.as_deref() == Some(token))
        {
            return Err(StoreError::UniqueViolation(format!(
                "share token {token} already exists"
            )));
        }

        match tables.notes.iter_mut().find(|n| n.id == note_id) {
            Some(note) => {
                note.share_token = Some(token.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn note_id_by_share_token(&self, token: &str) -> Result<Option<i64>, StoreError> {
        Ok(self
            .lock()
            .notes
            .iter()
            .find(|n| n.share_token.as_deref() == Some(token))
            .map(|n| n.id))
    }

    async fn add_collaborator(
        &self,
        note_id: i64,
        user_id: i64,
        can_edit: bool,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock();
        if !tables
            .collaborators
            .iter()
            .any(|c| c.note_id == note_id && c.user_id == user_id)
        {
            tables.collaborators.push(Collaborator {
                note_id,
                user_id,
                can_edit,
            });
        }
        Ok(())
    }

    async fn collaborator_can_edit(
        &self,
        note_id: i64,
        user_id: i64,
    ) -> Result<Option<bool>, StoreError> {
        Ok(self
            .lock()
            .collaborators
            .iter()
            .find(|c| c.note_id == note_id && c.user_id == user_id)
            .map(|c| c.can_edit))
    }

    async fn insert_log(&self, entry: LogEntry) -> Result<(), StoreError> {
        if self.fail_log_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("log store"));
        }
        self.lock().logs.push(entry);
        Ok(())
    }
}
