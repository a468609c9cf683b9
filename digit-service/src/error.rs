use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 数字识别接口错误
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("No file uploaded: expected multipart field `file`")]
    MissingFile,

    #[error("Invalid upload: {0}")]
    Upload(String),

    #[error("Cannot identify image file: {0}")]
    Decode(String),

    #[error("Unexpected model output: {0}")]
    Output(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

impl ClassifyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClassifyError::MissingFile | ClassifyError::Upload(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ClassifyError::Decode(_) | ClassifyError::Output(_) | ClassifyError::Inference(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ClassifyError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
