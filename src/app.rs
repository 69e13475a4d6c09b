use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use axum_macros::FromRef;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use crate::{
    auth::{self, TokenKeys},
    handlers::rest,
    middleware::{RequestLog, log_requests},
    repository::Store,
    service::{AccountService, NoteService},
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub notes: Arc<NoteService>,
    pub accounts: Arc<AccountService>,
    pub tokens: Arc<TokenKeys>,
    pub request_log: RequestLog,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenKeys>, request_log: RequestLog) -> Self {
        Self {
            notes: Arc::new(NoteService::new(store.clone())),
            accounts: Arc::new(AccountService::new(store, tokens.clone())),
            tokens,
            request_log,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/notes", get(rest::list_notes).post(rest::create_note))
        .route("/notes/", get(rest::list_notes).post(rest::create_note))
        .route("/notes/join", post(rest::join_note))
        .route("/notes/{id}", put(rest::update_note).delete(rest::delete_note))
        .route("/notes/{id}/share", post(rest::share_note))
        .route("/notes/{id}/generate_share_token", post(rest::share_note))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/", get(rest::root))
        .route("/register", post(rest::register))
        .route("/login", post(rest::login))
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            state.request_log.clone(),
            log_requests,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
