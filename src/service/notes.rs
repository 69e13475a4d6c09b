use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use std::sync::Arc;

use crate::{
    dto::{
        CreateNoteRequest, JoinNoteRequest, JoinNoteResponse, MessageResponse, NoteResponse,
        ShareTokenResponse, UpdateNoteRequest,
    },
    error::ApiError,
    models::{DEFAULT_TODO_STATUS, NewNote, Note, NoteChanges, NoteKind},
    repository::Store,
};

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn Store>,
}

impl NoteService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_note(
        &self,
        caller_id: i64,
        request: CreateNoteRequest,
    ) -> Result<NoteResponse, ApiError> {
        let kind = NoteKind::normalize(request.kind.as_deref().unwrap_or_default());
        let date = parse_date(request.date.as_deref())?;
        let mut status = non_blank(request.status).map(|s| s.trim().to_string());
        if kind == NoteKind::Todo && status.is_none() {
            status = Some(DEFAULT_TODO_STATUS.to_string());
        }

        let id = self
            .store
            .insert_note(NewNote {
                owner_id: caller_id,
                date,
                kind,
                content: request.content.unwrap_or_default(),
                status,
            })
            .await?;

        let note = self
            .store
            .get_note(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("note {id} missing after insert")))?;

        tracing::info!(note_id = id, owner_id = caller_id, "note created");

        Ok(NoteResponse::for_caller(note, caller_id, false))
    }

    pub async fn list_notes(&self, caller_id: i64) -> Result<Vec<NoteResponse>, ApiError> {
        let notes = self.store.visible_notes(caller_id).await?;

        Ok(notes
            .into_iter()
            .map(|visible| NoteResponse::for_caller(visible.note, caller_id, visible.can_edit))
            .collect())
    }

    /// Applies the non-blank fields of `request`. Allowed for the owner and for
    /// collaborators holding edit rights.
    pub async fn update_note(
        &self,
        caller_id: i64,
        id: i64,
        request: UpdateNoteRequest,
    ) -> Result<MessageResponse, ApiError> {
        let note = self.existing_note(id).await?;
        if !self.can_edit(&note, caller_id).await? {
            return Err(ApiError::Forbidden(
                "Only the owner or an editing collaborator can update this note".to_string(),
            ));
        }

        let changes = NoteChanges {
            date: parse_date(request.date.as_deref())?,
            kind: non_blank(request.kind).map(|k| NoteKind::normalize(&k)),
            content: non_blank(request.content),
            status: non_blank(request.status).map(|s| s.trim().to_string()),
        };

        if !self.store.update_note(id, changes, Utc::now()).await? {
            return Err(ApiError::NotFound("Note not found".to_string()));
        }

        Ok(MessageResponse::new("Updated"))
    }

    /// Owner only.
    pub async fn delete_note(&self, caller_id: i64, id: i64) -> Result<MessageResponse, ApiError> {
        let note = self.existing_note(id).await?;
        if note.owner_id != caller_id {
            return Err(ApiError::Forbidden(
                "Only owner can delete this note".to_string(),
            ));
        }

        if !self.store.delete_note(id).await? {
            return Err(ApiError::NotFound("Note not found".to_string()));
        }

        tracing::info!(note_id = id, "note deleted");

        Ok(MessageResponse::new("Deleted"))
    }

    /// Replaces the note's share token with a fresh one. The owner is then
    /// recorded as an editing collaborator in a separate, best-effort write.
    pub async fn generate_share_token(
        &self,
        caller_id: i64,
        id: i64,
    ) -> Result<ShareTokenResponse, ApiError> {
        let note = self.existing_note(id).await?;
        if note.owner_id != caller_id {
            return Err(ApiError::Forbidden(
                "Only owner can generate share token".to_string(),
            ));
        }

        let token = Uuid::new_v4().to_string();
        if !self.store.set_share_token(id, &token).await? {
            return Err(ApiError::NotFound("Note not found".to_string()));
        }

        if let Err(e) = self.store.add_collaborator(id, caller_id, true).await {
            tracing::warn!(note_id = id, "failed to record owner as collaborator: {}", e);
        }

        tracing::info!(
            note_id = id,
            replaced = note.share_token.is_some(),
            "share token generated"
        );

        Ok(ShareTokenResponse { share_token: token })
    }

    pub async fn join_by_token(
        &self,
        caller_id: i64,
        request: JoinNoteRequest,
    ) -> Result<JoinNoteResponse, ApiError> {
        let token = request.token.trim();
        if token.is_empty() {
            return Err(ApiError::InvalidInput("Token required".to_string()));
        }

        let note_id = self
            .store
            .note_id_by_share_token(token)
            .await?
            .ok_or_else(|| ApiError::NotFound("Note not found for that token".to_string()))?;

        self.store.add_collaborator(note_id, caller_id, true).await?;

        tracing::info!(note_id, user_id = caller_id, "joined shared note");

        Ok(JoinNoteResponse {
            message: "Joined note successfully".to_string(),
            note_id,
        })
    }

    async fn existing_note(&self, id: i64) -> Result<Note, ApiError> {
        self.store
            .get_note(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))
    }

    async fn can_edit(&self, note: &Note, caller_id: i64) -> Result<bool, ApiError> {
        if note.owner_id == caller_id {
            return Ok(true);
        }

        Ok(self
            .store
            .collaborator_can_edit(note.id, caller_id)
            .await?
            .unwrap_or(false))
    }
}

/// Blank means absent; anything else must be `YYYY-MM-DD`.
fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::InvalidDate),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
