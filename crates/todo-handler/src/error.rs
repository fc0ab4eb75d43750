use domain::TodoError;
use serde_json::json;
use thiserror::Error;

use crate::response::ApiGatewayProxyResponse;

pub const NOT_FOUND_MESSAGE: &str = "todo not found";
pub const UNSUPPORTED_MESSAGE: &str = "Unsupported route or method";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("todo not found: {id}")]
    NotFound { id: String },

    #[error("Unsupported route or method: {method}")]
    Unsupported {
        method: String,
        path: Option<String>,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) | ApiError::Unsupported { .. } => 400,
            ApiError::NotFound { .. } => 404,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> ApiGatewayProxyResponse {
        let status = self.status_code();
        let body = match self {
            ApiError::Validation(message) => json!({ "message": message }),
            ApiError::NotFound { id } => json!({ "message": NOT_FOUND_MESSAGE, "id": id }),
            ApiError::Unsupported { method, path } => {
                let mut body = json!({ "message": UNSUPPORTED_MESSAGE, "method": method });
                if let Some(path) = path {
                    body["path"] = json!(path);
                }
                body
            }
            ApiError::Internal(error) => {
                json!({ "message": INTERNAL_ERROR_MESSAGE, "error": error })
            }
        };

        ApiGatewayProxyResponse::json(status, body)
    }
}

impl From<TodoError> for ApiError {
    fn from(e: TodoError) -> Self {
        match e {
            TodoError::Validation(message) => ApiError::Validation(message),
            TodoError::NotFound(id) => ApiError::NotFound { id },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Internal(format!("Invalid JSON body: {e}"))
    }
}
