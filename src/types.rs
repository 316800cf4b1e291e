// Error types shared by the file store and the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::storage::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Gateway(GatewayError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Gateway(GatewayError::Credentials(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = match &self {
            AppError::Configuration(_) => "Storage is not configured",
            AppError::Gateway(_) => "Storage request failed",
            AppError::InvalidRequest(_) => "Invalid request",
        };

        (
            status,
            Json(serde_json::json!({
                "error": error,
                "details": self.to_string()
            })),
        )
            .into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let not_found = AppError::Gateway(GatewayError::NotFound {
            key: "paper/a.pdf".to_string(),
            request_id: None,
        });
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Gateway(GatewayError::Transport("timeout".to_string())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::InvalidRequest("no file".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_gateway_message_is_preserved() {
        let err = AppError::from(GatewayError::Rejected {
            status: 403,
            body: "AccessDenied".to_string(),
            request_id: None,
        });
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("AccessDenied"));
    }
}
