//! 预测接口错误类型
//!
//! 所有失败统一为 `PredictError`，并通过同一个映射转换为 HTTP 响应：
//! - 460 / 415 / 461 保留兼容的载荷格式（`{"<code>": "<message>"}`）
//! - 其余错误返回 `{"error": "<message>"}`，状态码按错误类别区分

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::scaler::ScalerError;

/// 请求体为空（兼容状态码）
pub const STATUS_NO_DATA: u16 = 460;
/// 列数不匹配（兼容状态码）
pub const STATUS_COLUMN_COUNT: u16 = 461;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("No data sent")]
    NoData,

    #[error("Incorrect data format")]
    IncorrectFormat,

    #[error("Incorrect number of columns. No of columns sent: {0}")]
    ColumnCount(usize),

    #[error("Malformed JSON body: {0}")]
    MalformedJson(String),

    /// 缺失字段、非数值字段、派生特征非有限值
    #[error("{0}")]
    Validation(String),

    /// 缩放器或模型推理失败
    #[error("{0}")]
    Internal(String),
}

impl From<ScalerError> for PredictError {
    fn from(e: ScalerError) -> Self {
        PredictError::Internal(e.to_string())
    }
}

impl PredictError {
    /// 错误对应的 HTTP 状态码
    ///
    /// `legacy_error_status` 为 true 时，400/422/500 类错误按旧行为返回 200
    pub fn status_code(&self, legacy_error_status: bool) -> StatusCode {
        match self {
            PredictError::NoData => custom_status(STATUS_NO_DATA),
            PredictError::IncorrectFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PredictError::ColumnCount(_) => custom_status(STATUS_COLUMN_COUNT),
            _ if legacy_error_status => StatusCode::OK,
            PredictError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            PredictError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PredictError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 响应载荷
    pub fn body(&self) -> serde_json::Value {
        let message = self.to_string();
        match self {
            PredictError::NoData => json!({ "460": message }),
            PredictError::IncorrectFormat => json!({ "415": message }),
            PredictError::ColumnCount(_) => json!({ "461": message }),
            _ => json!({ "error": message }),
        }
    }

    pub fn into_http_response(self, legacy_error_status: bool) -> Response {
        (self.status_code(legacy_error_status), Json(self.body())).into_response()
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        self.into_http_response(false)
    }
}

fn custom_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}
