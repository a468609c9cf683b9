//! HTTP 服务器，对外提供数字识别接口

use anyhow::Result;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::classifier::DigitClassifier;
use crate::config::{CorsConfig, ServerConfig};
use crate::error::ClassifyError;

/// 上传文件所在的 multipart 字段名
pub const FILE_FIELD: &str = "file";

/// HTTP 服务器状态
#[derive(Clone)]
pub struct ServerState {
    pub classifier: Arc<DigitClassifier>,
}

/// 识别结果（响应格式）
#[derive(Debug, Serialize)]
pub struct DigitResponse {
    pub predicted_digit: u8,
}

pub fn router(state: ServerState, cors: &CorsConfig) -> Router {
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/predict/", post(handle_predict))
        // 不带斜杠的路径同样可用
        .route("/predict", post(handle_predict))
        // 不限制上传大小
        .layer(DefaultBodyLimit::disable())
        .with_state(state);

    if !cors.enabled {
        return app;
    }
    if cors.allow_credentials {
        app.layer(CorsLayer::very_permissive())
    } else {
        app.layer(CorsLayer::permissive())
    }
}

/// 启动 HTTP 服务器
pub async fn start_server(config: &ServerConfig, cors: &CorsConfig, state: ServerState) -> Result<()> {
    let app = router(state, cors);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Digit service listening on: {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// 健康检查
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 处理识别请求
async fn handle_predict(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DigitResponse>, ClassifyError> {
    let result = classify_upload(state, multipart).await;
    if let Err(e) = &result {
        error!("Digit prediction failed: {}", e);
    }
    result
}

async fn classify_upload(
    state: ServerState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DigitResponse>, ClassifyError> {
    let mut multipart = multipart.map_err(|e| ClassifyError::Upload(e.body_text()))?;

    let mut image_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ClassifyError::Upload(e.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ClassifyError::Upload(e.body_text()))?;
            info!(size = bytes.len(), "Received upload");
            image_bytes = Some(bytes);
            break;
        }
    }
    let image_bytes = image_bytes.ok_or(ClassifyError::MissingFile)?;

    let classifier = state.classifier.clone();
    let predicted_digit = tokio::task::spawn_blocking(move || classifier.classify(&image_bytes))
        .await
        .map_err(|e| ClassifyError::Inference(format!("Classification task failed: {}", e)))??;

    Ok(Json(DigitResponse { predicted_digit }))
}
