use chrono::{DateTime, NaiveDate, Utc};

/// Status stored on a todo created without one.
pub const DEFAULT_TODO_STATUS: &str = "on_progress";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteKind {
    #[default]
    Note,
    Todo,
}

impl NoteKind {
    /// Only `todo` (any case, surrounding whitespace ignored) selects a todo;
    /// every other value, including an empty one, is a plain note.
    pub fn normalize(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("todo") {
            Self::Todo
        } else {
            Self::Note
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Todo => "todo",
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    #[allow(dead_code)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Note {
    pub id: i64,
    pub owner_id: i64,
    pub date: Option<NaiveDate>,
    pub kind: NoteKind,
    pub content: String,
    pub status: Option<String>,
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note as seen by one caller: the note plus that caller's collaboration flag.
#[derive(Debug, Clone)]
pub struct VisibleNote {
    pub note: Note,
    pub can_edit: bool,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_id: i64,
    pub date: Option<NaiveDate>,
    pub kind: NoteKind,
    pub content: String,
    pub status: Option<String>,
}

/// Partial update of a note. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub date: Option<NaiveDate>,
    pub kind: Option<NoteKind>,
    pub content: Option<String>,
    pub status: Option<String>,
}

/// One request/response pair captured by the request logger.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub datetime: DateTime<Utc>,
    pub method: String,
    pub endpoint: String,
    pub request_headers: serde_json::Value,
    pub payload: String,
    pub response_body: String,
    pub status_code: i32,
}
