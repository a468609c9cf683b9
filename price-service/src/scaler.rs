//! Min-max 缩放器
//!
//! 工件格式（JSON，由训练侧导出）：
//! `{"data_min": [...], "data_max": [...], "feature_range": [0.0, 1.0]}`
//!
//! 与训练时的 MinMaxScaler 语义一致：
//! `scale_ = (fr_max - fr_min) / (data_max - data_min)`（极差为 0 时按 1 处理），
//! `min_ = fr_min - data_min * scale_`，`transform(x) = x * scale_ + min_`。

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum ScalerError {
    #[error("X has {got} features, but MinMaxScaler is expecting {expected} features as input")]
    FeatureCount { expected: usize, got: usize },

    #[error("Invalid scaler artifact: {0}")]
    Invalid(String),
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

impl MinMaxScaler {
    /// 在单个样本上拟合（每个特征 min == max）
    pub fn fit(row: &[f64]) -> Self {
        Self {
            data_min: row.to_vec(),
            data_max: row.to_vec(),
            feature_range: default_feature_range(),
        }
    }

    /// 从 JSON 工件加载训练时拟合的统计量
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Scaler file not found: {}", path.display()));
        }
        info!("Loading scaler from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read scaler file {}: {}", path.display(), e))?;
        let scaler: MinMaxScaler = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scaler file {}: {}", path.display(), e))?;
        scaler.validate()?;

        info!(n_features = scaler.n_features(), "Scaler loaded successfully");
        Ok(scaler)
    }

    pub fn validate(&self) -> Result<(), ScalerError> {
        if self.data_min.is_empty() {
            return Err(ScalerError::Invalid("no features".to_string()));
        }
        if self.data_min.len() != self.data_max.len() {
            return Err(ScalerError::Invalid(format!(
                "data_min has {} entries but data_max has {}",
                self.data_min.len(),
                self.data_max.len()
            )));
        }
        let (lo, hi) = self.feature_range;
        if !(lo < hi) {
            return Err(ScalerError::Invalid(format!(
                "feature_range minimum {} must be smaller than maximum {}",
                lo, hi
            )));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.data_min.len()
    }

    /// 每个特征的 (scale_, min_)
    fn coefficients(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let (lo, hi) = self.feature_range;
        self.data_min
            .iter()
            .zip(&self.data_max)
            .map(move |(&dmin, &dmax)| {
                let range = dmax - dmin;
                let range = if range == 0.0 { 1.0 } else { range };
                let scale = (hi - lo) / range;
                (scale, lo - dmin * scale)
            })
    }

    fn check_len(&self, values: &[f64]) -> Result<(), ScalerError> {
        if values.len() != self.n_features() {
            return Err(ScalerError::FeatureCount {
                expected: self.n_features(),
                got: values.len(),
            });
        }
        Ok(())
    }

    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalerError> {
        self.check_len(values)?;
        Ok(values
            .iter()
            .zip(self.coefficients())
            .map(|(&x, (scale, min))| x * scale + min)
            .collect())
    }

    pub fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalerError> {
        self.check_len(values)?;
        Ok(values
            .iter()
            .zip(self.coefficients())
            .map(|(&x, (scale, min))| (x - min) / scale)
            .collect())
    }
}

/// 输入特征的归一化方式
#[derive(Debug, Clone)]
pub enum InputScaling {
    /// 每个请求单独拟合一次（单行拟合，所有特征都会变成 feature_range 下界）
    PerRequest,
    /// 使用训练时持久化的统计量
    Fitted(MinMaxScaler),
}

impl InputScaling {
    pub fn apply(&self, values: &[f64]) -> Result<Vec<f64>, ScalerError> {
        match self {
            InputScaling::PerRequest => MinMaxScaler::fit(values).transform(values),
            InputScaling::Fitted(scaler) => scaler.transform(values),
        }
    }
}
