//! API error type
//!
//! Maps `scholia_core::Error` onto HTTP status codes with a JSON body
//! `{ "success": false, "error": "...", "code": "..." }`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scholia_core::Error;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    success: bool,
    error: String,
    code: &'static str,
    /// The triggering action was stored even though the request failed
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    recorded: bool,
}

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    recorded: bool,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
            recorded: false,
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: message.into(),
            recorded: false,
        }
    }

    /// Malformed request the framework refused to extract
    fn rejected(status: StatusCode, message: String) -> Self {
        let code = match status {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
            StatusCode::UNPROCESSABLE_ENTITY => "INVALID_BODY",
            s if s.is_server_error() => "INTERNAL_ERROR",
            _ => "BAD_REQUEST",
        };
        Self {
            status,
            code,
            message,
            recorded: false,
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_not_found() {
            return Self {
                status: StatusCode::NOT_FOUND,
                code: "NOT_FOUND",
                message: err.to_string(),
                recorded: false,
            };
        }

        match err {
            Error::Validation(msg) => Self::bad_request(msg),
            Error::RewardsFailed { .. } => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "REWARDS_FAILED",
                message: err.to_string(),
                recorded: true,
            },
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, "Request failed: {}", self.message);
        }

        let body = ApiErrorBody {
            success: false,
            error: self.message,
            code: self.code,
            recorded: self.recorded,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::UserNotFound("u".into()), StatusCode::NOT_FOUND),
            (Error::BadgeNotFound("b".into()), StatusCode::NOT_FOUND),
            (Error::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (Error::Catalog("broken".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_rejection_codes() {
        let err = ApiError::rejected(StatusCode::BAD_REQUEST, "bad id".into());
        assert_eq!(err.code, "BAD_REQUEST");
        let err = ApiError::rejected(StatusCode::UNPROCESSABLE_ENTITY, "missing field".into());
        assert_eq!(err.code, "INVALID_BODY");
        let err = ApiError::rejected(StatusCode::UNSUPPORTED_MEDIA_TYPE, "not json".into());
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(err.code, "UNSUPPORTED_MEDIA_TYPE");
    }

    #[test]
    fn test_rewards_failure_is_marked_recorded() {
        let err = ApiError::from(Error::RewardsFailed {
            action: "forum_post",
            source: Box::new(Error::Catalog("boom".into())),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.recorded);
        assert_eq!(err.code, "REWARDS_FAILED");
    }
}
