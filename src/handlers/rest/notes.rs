use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;

use std::sync::Arc;

use super::{invalid_input, invalid_note_id};
use crate::{
    auth::CallerId,
    dto::{
        CreateNoteRequest, ErrorResponse, JoinNoteRequest, JoinNoteResponse, MessageResponse,
        NoteResponse, ShareTokenResponse, UpdateNoteRequest,
    },
    service::NoteService,
};

#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "Notes owned by or shared with the caller, newest first", body = Vec<NoteResponse>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
#[debug_handler]
pub async fn list_notes(
    State(service): State<Arc<NoteService>>,
    Extension(CallerId(caller_id)): Extension<CallerId>,
) -> Response {
    match service.list_notes(caller_id).await {
        Ok(notes) => (StatusCode::OK, Json(notes)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 400, description = "Malformed body or date", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    Extension(CallerId(caller_id)): Extension<CallerId>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return invalid_input();
    };

    match service.create_note(caller_id, payload).await {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = MessageResponse),
        (status = 400, description = "Malformed body, id or date", body = ErrorResponse),
        (status = 403, description = "Caller may not edit this note", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(service): State<Arc<NoteService>>,
    Extension(CallerId(caller_id)): Extension<CallerId>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return invalid_note_id();
    };
    let Ok(Json(payload)) = payload else {
        return invalid_input();
    };

    match service.update_note(caller_id, id, payload).await {
        Ok(message) => (StatusCode::OK, Json(message)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted successfully", body = MessageResponse),
        (status = 403, description = "Caller does not own this note", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(service): State<Arc<NoteService>>,
    Extension(CallerId(caller_id)): Extension<CallerId>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return invalid_note_id();
    };

    match service.delete_note(caller_id, id).await {
        Ok(message) => (StatusCode::OK, Json(message)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Also served as `POST /notes/{id}/generate_share_token`.
#[utoipa::path(
    post,
    path = "/notes/{id}/share",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Fresh share token", body = ShareTokenResponse),
        (status = 403, description = "Only the owner can share", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
#[debug_handler]
pub async fn share_note(
    State(service): State<Arc<NoteService>>,
    Extension(CallerId(caller_id)): Extension<CallerId>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return invalid_note_id();
    };

    match service.generate_share_token(caller_id, id).await {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/notes/join",
    request_body = JoinNoteRequest,
    responses(
        (status = 200, description = "Caller is now a collaborator", body = JoinNoteResponse),
        (status = 400, description = "Missing token", body = ErrorResponse),
        (status = 404, description = "No note carries that token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
#[debug_handler]
pub async fn join_note(
    State(service): State<Arc<NoteService>>,
    Extension(CallerId(caller_id)): Extension<CallerId>,
    payload: Result<Json<JoinNoteRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return invalid_input();
    };

    match service.join_by_token(caller_id, payload).await {
        Ok(joined) => (StatusCode::OK, Json(joined)).into_response(),
        Err(e) => e.into_response(),
    }
}
