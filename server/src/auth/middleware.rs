//! Authentication middleware.
//!
//! Bearer token extraction. With `AUTH_SECRET` configured the token must
//! match it; without one any non-empty token is accepted.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::AppState;

/// Authenticated caller extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                tracing::debug!("Missing authorization header");
                AppError::Unauthorized
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                tracing::debug!("Malformed authorization header");
                AppError::Unauthorized
            })?;

        if let Some(secret) = &state.config.auth_secret {
            if token != secret {
                tracing::debug!("Bearer token rejected");
                return Err(AppError::Unauthorized);
            }
        }

        Ok(AuthUser {
            token: token.to_string(),
        })
    }
}
