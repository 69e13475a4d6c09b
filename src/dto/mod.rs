use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Note;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed bearer token, valid for 72 hours by default
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,
    /// Owner's user ID
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Either `note` or `todo`
    #[serde(rename = "type")]
    pub kind: String,
    /// Note content
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Whether the caller holds an editing collaboration on the note
    pub can_edit: bool,
    /// Whether the caller owns the note
    pub is_owner: bool,
}

impl NoteResponse {
    pub fn for_caller(note: Note, caller_id: i64, can_edit: bool) -> Self {
        Self {
            id: note.id,
            user_id: note.owner_id,
            date: note.date,
            kind: note.kind.as_str().to_string(),
            content: note.content,
            status: note.status,
            created_at: note.created_at,
            updated_at: note.updated_at,
            can_edit,
            is_owner: note.owner_id == caller_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateNoteRequest {
    /// Optional date in `YYYY-MM-DD` format
    pub date: Option<String>,
    /// `todo` (any case) or anything else for a plain note
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Note content
    pub content: Option<String>,
    /// Defaults to `on_progress` for todos
    pub status: Option<String>,
}

/// Fields left out or blank keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateNoteRequest {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShareTokenResponse {
    pub share_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct JoinNoteRequest {
    /// Share token handed out by the note's owner
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JoinNoteResponse {
    pub message: String,
    pub note_id: i64,
}
