//! 房价回归模型
//!
//! 训练侧导出的 ONNX 模型，输入 `[1, n_features]` 的 f32 张量，
//! 输出 `[1, 1]` 的归一化价格。

use anyhow::{anyhow, Result};
use ndarray::Array2;
use ort::{session::Session, value::Tensor};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// 回归模型：输入一行归一化特征，输出归一化价格
pub trait PriceRegressor: Send + Sync {
    fn predict(&self, row: &[f32]) -> Result<f32>;
}

/// ONNX Runtime 回归模型
pub struct OnnxRegressor {
    session: Mutex<Session>,
    model_path: PathBuf,
}

impl OnnxRegressor {
    /// 从模型文件加载（进程启动时调用一次）
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            return Err(anyhow!("Model file not found: {}", model_path.display()));
        }

        info!("Loading price model from: {}", model_path.display());

        let model_data = std::fs::read(model_path)
            .map_err(|e| anyhow!("Failed to read model file: {}", e))?;

        let session = Session::builder()
            .map_err(|e| anyhow!("Failed to create session builder: {}", e))?
            .commit_from_memory(&model_data)
            .map_err(|e| anyhow!("Failed to load model: {}", e))?;

        info!("Price model loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl PriceRegressor for OnnxRegressor {
    fn predict(&self, row: &[f32]) -> Result<f32> {
        let input_array = Array2::from_shape_vec((1, row.len()), row.to_vec())
            .map_err(|e| anyhow!("Failed to create input array: {}", e))?;

        let input_shape = input_array.shape().to_vec();
        let input_vec: Vec<f32> = input_array.into_iter().collect();
        let input_tensor = Tensor::from_array((input_shape, input_vec))
            .map_err(|e| anyhow!("Failed to create model input: {}", e))?;

        let mut session_guard = self
            .session
            .lock()
            .map_err(|e| anyhow!("Failed to lock session: {}", e))?;

        let outputs = session_guard
            .run(ort::inputs![input_tensor])
            .map_err(|e| anyhow!("ONNX inference failed: {}", e))?;

        let (output_shape, output_data): (&ort::tensor::Shape, &[f32]) = outputs[0]
            .try_extract_tensor()
            .map_err(|e| anyhow!("Failed to extract output: {}", e))?;

        debug!(output_shape = ?output_shape, "Price model output");

        let prediction = output_data.first().copied();
        prediction.ok_or_else(|| anyhow!("Model returned an empty output tensor"))
    }
}
