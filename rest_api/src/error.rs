// rest_api/src/error.rs

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use models::errors::StaffError;
use security::AuthError;

/// Message returned for every storage-class failure.
pub const SERVER_ERROR: &str = "Server error";

/// Uniform response body: `{ success, message, data?, error? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        ApiResponse { success: true, message: message.into(), data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse { success: true, message: message.into(), data: None, error: None }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        ApiResponse { success: false, message: message.into(), data: None, error: Some(error.into()) }
    }
}

/// What a handler returns on success.
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), RestApiError>;

pub fn respond<T: Serialize>(status: StatusCode, message: impl Into<String>, data: T) -> ApiResult<T> {
    Ok((status, Json(ApiResponse::ok(message, data))))
}

#[derive(Debug, Error)]
pub enum RestApiError {
    #[error(transparent)]
    Staff(#[from] StaffError),
    #[error("Invalid form data: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Invalid form data: {0}")]
    MultipartRejection(#[from] MultipartRejection),
    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),
}

impl From<AuthError> for RestApiError {
    fn from(err: AuthError) -> Self {
        RestApiError::Staff(err.into())
    }
}

impl RestApiError {
    /// Whether the error text may be shown to the caller.
    pub fn is_client_error(&self) -> bool {
        match self {
            RestApiError::Staff(e) => e.is_client_error(),
            RestApiError::Multipart(_) | RestApiError::MultipartRejection(_) | RestApiError::Json(_) => true,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RestApiError::Staff(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            RestApiError::Multipart(e) => client_status(e.status()),
            RestApiError::MultipartRejection(e) => client_status(e.status()),
            RestApiError::Json(e) => client_status(e.status()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            RestApiError::Staff(StaffError::Validation(_)) => "ValidationError",
            RestApiError::Staff(StaffError::Conflict(_)) => "ConflictError",
            RestApiError::Staff(StaffError::NotFound(_)) => "NotFoundError",
            RestApiError::Staff(StaffError::Auth(_)) => "AuthError",
            RestApiError::Staff(_) => "ServerError",
            RestApiError::Multipart(_) | RestApiError::MultipartRejection(_) | RestApiError::Json(_) => {
                "ValidationError"
            }
        }
    }
}

// Malformed request bodies are reported as the client's fault.
fn client_status(status: StatusCode) -> StatusCode {
    if status.is_server_error() { StatusCode::BAD_REQUEST } else { status }
}

impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if !self.is_client_error() {
            tracing::error!(error = %self, "Request failed");
            SERVER_ERROR.to_string()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        (status, Json(ApiResponse::failure(message, self.kind()))).into_response()
    }
}
