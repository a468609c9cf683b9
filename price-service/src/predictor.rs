//! 房价预测流水线：请求体 -> 特征工程 -> 归一化 -> 模型推理 -> 反归一化

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::PredictError;
use crate::features::{HousingFeatures, EXPECTED_COLUMNS};
use crate::regressor::PriceRegressor;
use crate::scaler::{InputScaling, MinMaxScaler};

/// 预测结果（响应格式）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePrediction {
    pub predicted_price: f64,
}

/// 进程级只读的预测器：模型与缩放器在启动时加载一次
pub struct PricePredictor {
    regressor: Arc<dyn PriceRegressor>,
    input_scaling: InputScaling,
    output_scaler: MinMaxScaler,
}

impl PricePredictor {
    pub fn new(
        regressor: Arc<dyn PriceRegressor>,
        input_scaling: InputScaling,
        output_scaler: MinMaxScaler,
    ) -> Result<Self> {
        output_scaler.validate()?;
        if output_scaler.n_features() != 1 {
            return Err(anyhow!(
                "Output scaler must have exactly 1 feature, found {}",
                output_scaler.n_features()
            ));
        }
        if let InputScaling::Fitted(scaler) = &input_scaling {
            scaler.validate()?;
            if scaler.n_features() != EXPECTED_COLUMNS {
                return Err(anyhow!(
                    "Input scaler must have {} features, found {}",
                    EXPECTED_COLUMNS,
                    scaler.n_features()
                ));
            }
        }

        Ok(Self {
            regressor,
            input_scaling,
            output_scaler,
        })
    }

    pub fn input_scaling(&self) -> &InputScaling {
        &self.input_scaling
    }

    /// 处理一个原始请求体
    pub fn predict(&self, body: &[u8]) -> Result<PricePrediction, PredictError> {
        let payload = parse_payload(body)?;
        let features = HousingFeatures::from_payload(payload)?;
        let row = features.derive()?;

        // 列数在归一化之前检查：拟合统计量只接受固定列数
        if row.len() != EXPECTED_COLUMNS {
            return Err(PredictError::ColumnCount(row.len()));
        }

        let scaled = self.input_scaling.apply(row.values())?;
        debug!(columns = ?row.names(), scaled = ?scaled, "Feature row prepared");

        let model_input: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();
        let prediction_scaled = self
            .regressor
            .predict(&model_input)
            .map_err(|e| PredictError::Internal(e.to_string()))?;

        let prediction_real = self
            .output_scaler
            .inverse_transform(&[f64::from(prediction_scaled)])?;
        let predicted_price = prediction_real[0];

        if !predicted_price.is_finite() {
            return Err(PredictError::Internal(format!(
                "Model produced a non-finite prediction: {}",
                predicted_price
            )));
        }

        debug!(prediction_scaled, predicted_price, "Prediction finished");
        Ok(PricePrediction { predicted_price })
    }
}

/// 解析请求体并完成形状校验
///
/// 空请求体以及“空”的 JSON 值（null、false、0、""、[]、{}）都视为未发送数据。
pub fn parse_payload(body: &[u8]) -> Result<serde_json::Value, PredictError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PredictError::NoData);
    }

    let payload: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| PredictError::MalformedJson(e.to_string()))?;

    if is_empty_value(&payload) {
        return Err(PredictError::NoData);
    }
    if !payload.is_object() {
        return Err(PredictError::IncorrectFormat);
    }

    Ok(payload)
}

fn is_empty_value(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
