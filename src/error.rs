use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::auth::dto::ApiResponse;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("{0}")]
    AlreadyExists(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidCredentials(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Text shown to the client; internal causes stay in the logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::InvalidInput(msg)
            | AuthError::AlreadyExists(msg)
            | AuthError::NotFound(msg)
            | AuthError::InvalidCredentials(msg)
            | AuthError::Unauthorized(msg) => msg,
            AuthError::Internal(_) => "Something went wrong, please try again",
        }
    }
}

// Clients read the outcome from `success`, so every failure is still a 200.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(e) = &self {
            error!(error = ?e, "request failed");
        }
        let body = ApiResponse::failure(self.client_message());
        (StatusCode::OK, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = AuthError::from(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(err.client_message(), "Something went wrong, please try again");
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn failures_render_as_ok_with_success_false() {
        let res = AuthError::NotFound("User not found").into_response();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "User not found");
        assert!(json.get("token").is_none());
    }
}
