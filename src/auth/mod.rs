//! Bearer-token authorization gate plus the password and token primitives
//! behind it.

pub mod password;
pub mod token;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use std::sync::Arc;

pub use token::TokenKeys;

use crate::error::ApiError;

/// Id of the authenticated caller, placed in the request extensions by
/// [`require_bearer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub i64);

/// Rejects requests without a valid `Authorization: Bearer <token>` header and
/// attaches the caller's id to the rest.
pub async fn require_bearer(
    State(keys): State<Arc<TokenKeys>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = authenticate(request.headers(), &keys)?;
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

pub fn authenticate(headers: &HeaderMap, keys: &TokenKeys) -> Result<CallerId, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)?;

    let claims = keys.verify(token).map_err(|e| {
        tracing::debug!("rejected bearer token: {}", e);
        ApiError::InvalidToken
    })?;

    Ok(CallerId(claims.user_id))
}
