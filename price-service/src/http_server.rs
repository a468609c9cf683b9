//! HTTP 服务器，对外提供房价预测接口

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::PredictError;
use crate::predictor::PricePredictor;

/// HTTP 服务器状态
#[derive(Clone)]
pub struct ServerState {
    pub predictor: Arc<PricePredictor>,
    pub legacy_error_status: bool,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/predict", post(handle_predict))
        .with_state(state)
}

/// 启动 HTTP 服务器
pub async fn start_server(config: &ServerConfig, state: ServerState) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Price service listening on: {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// 健康检查
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 处理预测请求
///
/// 请求体按原始字节读取，空请求体与非 JSON 的区分由预测器完成。
async fn handle_predict(State(state): State<ServerState>, body: Bytes) -> Response {
    let predictor = state.predictor.clone();
    let result = tokio::task::spawn_blocking(move || predictor.predict(&body))
        .await
        .unwrap_or_else(|e| Err(PredictError::Internal(format!("Prediction task failed: {}", e))));

    match result {
        Ok(prediction) => {
            info!(predicted_price = prediction.predicted_price, "Prediction served");
            (StatusCode::OK, Json(prediction)).into_response()
        }
        Err(e) => {
            error!("Prediction failed: {}", e);
            e.into_http_response(state.legacy_error_status)
        }
    }
}
