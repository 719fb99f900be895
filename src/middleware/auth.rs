//! Authentication middleware for Axum
//!
//! Identity is asserted by the gateway in a configurable header carrying the
//! identity provider's user id. `RequireUser` resolves it to a synced
//! [`User`]; `RequireSyncSecret` guards the sign-in sync endpoint.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use scholia_core::{GamificationEngine, User};
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::error;

/// Header carrying the sync secret
pub const SYNC_SECRET_HEADER: &str = "x-sync-secret";

/// Authentication settings shared with the extractors
#[derive(Debug, Clone)]
pub struct AuthSettings {
    identity_header: String,
    sync_secret: Option<String>,
}

impl AuthSettings {
    /// An empty secret leaves the sync endpoint open
    pub fn new(identity_header: &str, sync_secret: &str) -> Self {
        Self {
            identity_header: identity_header.trim().to_ascii_lowercase(),
            sync_secret: (!sync_secret.is_empty()).then(|| sync_secret.to_string()),
        }
    }

    /// Lowercased identity header name
    pub fn identity_header(&self) -> &str {
        &self.identity_header
    }

    /// Check a presented sync secret; always true when none is configured
    pub fn accepts_sync_secret(&self, provided: Option<&str>) -> bool {
        let Some(expected) = self.sync_secret.as_deref() else {
            return true;
        };
        // Constant-time comparison of the secret bytes
        provided.is_some_and(|p| p.as_bytes().ct_eq(expected.as_bytes()).into())
    }
}

/// JSON error response for auth failures
#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl AuthErrorResponse {
    fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Auth rejection type
#[derive(Debug)]
pub struct AuthRejection {
    status: StatusCode,
    body: AuthErrorResponse,
}

impl AuthRejection {
    fn unauthorized(error: impl Into<String>, code: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: AuthErrorResponse::new(error, code),
        }
    }

    fn internal(error: impl Into<String>) -> Self {
        let error = error.into();
        error!("Auth failure: {error}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: AuthErrorResponse::new(error, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn settings(parts: &Parts) -> Result<Arc<AuthSettings>, AuthRejection> {
    parts
        .extensions
        .get::<Arc<AuthSettings>>()
        .cloned()
        .ok_or_else(|| AuthRejection::internal("AuthSettings not configured"))
}

// ============================================================================
// RequireUser Extractor
// ============================================================================

/// Axum extractor resolving the signed-in user.
///
/// Rejects with 401 when the identity header is missing or names a user that
/// never signed in.
pub struct RequireUser(pub User);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let settings = settings(parts)?;
        let engine = parts
            .extensions
            .get::<Arc<GamificationEngine>>()
            .cloned()
            .ok_or_else(|| AuthRejection::internal("GamificationEngine not configured"))?;

        let external_id = parts
            .headers
            .get(settings.identity_header())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AuthRejection::unauthorized(
                    format!(
                        "Authentication required. Provide the {} header.",
                        settings.identity_header()
                    ),
                    "UNAUTHORIZED",
                )
            })?;

        match engine.store().find_user_by_external_id(external_id).await {
            Ok(Some(user)) => Ok(RequireUser(user)),
            Ok(None) => Err(AuthRejection::unauthorized(
                "Unknown user. Sign in again to sync your profile.",
                "UNKNOWN_USER",
            )),
            Err(e) => Err(AuthRejection::internal(e.to_string())),
        }
    }
}

// ============================================================================
// RequireSyncSecret Extractor
// ============================================================================

/// Axum extractor checking the `x-sync-secret` header when a secret is set.
pub struct RequireSyncSecret;

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequireSyncSecret
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let settings = settings(parts)?;
        let provided = parts
            .headers
            .get(SYNC_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());

        if settings.accepts_sync_secret(provided) {
            Ok(RequireSyncSecret)
        } else {
            Err(AuthRejection::unauthorized(
                "Invalid or missing sync secret",
                "INVALID_CREDENTIALS",
            ))
        }
    }
}
