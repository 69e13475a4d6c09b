use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;

use std::sync::Arc;

use super::invalid_input;
use crate::{
    dto::{CredentialsRequest, ErrorResponse, MessageResponse, TokenResponse},
    service::AccountService,
};

#[utoipa::path(
    post,
    path = "/register",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "User registered", body = MessageResponse),
        (status = 400, description = "Missing fields or username taken", body = ErrorResponse)
    ),
    tag = "accounts"
)]
#[debug_handler]
pub async fn register(
    State(service): State<Arc<AccountService>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return invalid_input();
    };

    match service.register(payload).await {
        Ok(message) => (StatusCode::OK, Json(message)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed bearer token", body = TokenResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid username/password", body = ErrorResponse)
    ),
    tag = "accounts"
)]
#[debug_handler]
pub async fn login(
    State(service): State<Arc<AccountService>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return invalid_input();
    };

    match service.login(payload).await {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(e) => e.into_response(),
    }
}
