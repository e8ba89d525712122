//! Optional HTTP Basic gate for viewer endpoints.
//!
//! Credentials are a single shared pair from the environment. When none are
//! configured the extractor always succeeds.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor proving the caller passed the viewer credential check.
pub struct ViewerAuth;

impl FromRequestParts<Arc<AppState>> for ViewerAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = &state.config.credentials else {
            return Ok(ViewerAuth);
        };

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let encoded = header
            .strip_prefix("Basic ")
            .ok_or(ApiError::Unauthorized)?;
        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|_| ApiError::Unauthorized)?;
        let decoded = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;
        let (username, password) = decoded.split_once(':').ok_or(ApiError::Unauthorized)?;

        // Constant-time on both fields; no early exit on a username mismatch.
        let user_ok = username.as_bytes().ct_eq(expected.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(expected.password.as_bytes());
        if bool::from(user_ok & pass_ok) {
            Ok(ViewerAuth)
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}
