mod accounts;
mod notes;

pub use accounts::{login, register};
pub use notes::{create_note, delete_note, join_note, list_notes, share_note, update_note};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    dto::{
        CreateNoteRequest, CredentialsRequest, ErrorResponse, JoinNoteRequest, JoinNoteResponse,
        MessageResponse, NoteResponse, ShareTokenResponse, TokenResponse, UpdateNoteRequest,
    },
    error::ApiError,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        accounts::register,
        accounts::login,
        notes::list_notes,
        notes::create_note,
        notes::update_note,
        notes::delete_note,
        notes::share_note,
        notes::join_note
    ),
    components(schemas(
        CredentialsRequest,
        MessageResponse,
        TokenResponse,
        ErrorResponse,
        NoteResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        ShareTokenResponse,
        JoinNoteRequest,
        JoinNoteResponse
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "accounts", description = "Registration and login"),
        (name = "notes", description = "Notes management and sharing API")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn root() -> Response {
    (StatusCode::OK, "Hello world!").into_response()
}

fn invalid_input() -> Response {
    ApiError::InvalidInput("Invalid input".to_string()).into_response()
}

fn invalid_note_id() -> Response {
    ApiError::InvalidInput("Invalid note id".to_string()).into_response()
}
