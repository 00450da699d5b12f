// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bearer token extraction for the server.
//!
//! Every `/api` handler takes a [`SessionActor`], so a request without a
//! valid token is answered with 401 before any business logic runs.

use agri_connect_api::AuthenticatedActor;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// Extractor for the authenticated caller.
///
/// # Authentication Flow
///
/// 1. Extract `Authorization: Bearer <token>` header
/// 2. Resolve the token through the configured identity provider
/// 3. Return the `AuthenticatedActor`
///
/// # Errors
///
/// Returns HTTP 401 Unauthorized if the header is missing or malformed, or
/// if the token is invalid or expired.
pub struct SessionActor(pub AuthenticatedActor);

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header: &str = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingToken
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::MissingToken
            })?;

        let token: &str = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                debug!("Authorization header is not a bearer token");
                SessionError::MissingToken
            })?;

        let actor: AuthenticatedActor = state.identity.resolve(token).map_err(|e| {
            debug!(error = %e, "Token rejected");
            SessionError::InvalidToken
        })?;

        debug!(user_id = actor.user_id, role = %actor.role, "Caller authenticated");

        Ok(Self(actor))
    }
}

/// Session extraction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// No usable bearer token was sent.
    MissingToken,
    /// The token did not verify or has expired.
    InvalidToken,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: &str = match self {
            Self::MissingToken => "Authentication token required.",
            Self::InvalidToken => "Invalid or expired token.",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                message: String::from(message),
                errors: None,
            }),
        )
            .into_response()
    }
}
