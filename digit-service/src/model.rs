//! 数字分类模型（ONNX Runtime）

use anyhow::{anyhow, Result};
use ndarray::Array4;
use ort::{session::Session, value::Tensor};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// 分类模型：输入 `[1, H, W, 1]` 张量，输出每个类别的分数
pub trait DigitModel: Send + Sync {
    fn scores(&self, input: &Array4<f32>) -> Result<Vec<f32>>;
}

pub struct OnnxDigitModel {
    session: Mutex<Session>,
    model_path: PathBuf,
}

impl OnnxDigitModel {
    /// 从模型文件加载（进程启动时调用一次）
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            return Err(anyhow!("Model file not found: {}", model_path.display()));
        }

        info!("Loading digit model from: {}", model_path.display());

        let session = Session::builder()
            .map_err(|e| anyhow!("Failed to create session builder: {}", e))?
            .commit_from_file(model_path)
            .map_err(|e| anyhow!("Failed to load model: {}", e))?;

        info!("Digit model loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl DigitModel for OnnxDigitModel {
    fn scores(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
        let input_shape = input.shape().to_vec();
        let input_vec: Vec<f32> = input.iter().copied().collect();
        let input_tensor = Tensor::from_array((input_shape, input_vec))
            .map_err(|e| anyhow!("Failed to create model input: {}", e))?;

        let mut session_guard = self
            .session
            .lock()
            .map_err(|e| anyhow!("Failed to lock session: {}", e))?;

        let outputs = session_guard
            .run(ort::inputs![input_tensor])
            .map_err(|e| anyhow!("ONNX inference failed: {}", e))?;

        let (_, output_data): (&ort::tensor::Shape, &[f32]) = outputs[0]
            .try_extract_tensor()
            .map_err(|e| anyhow!("Failed to extract output: {}", e))?;

        let scores = output_data.to_vec();
        Ok(scores)
    }
}
