use std::sync::Arc;
use tracing::debug;

use crate::config::PreprocessConfig;
use crate::error::ClassifyError;
use crate::model::DigitModel;
use crate::preprocess::{argmax, to_input_tensor};

/// 数字识别器：预处理 + 模型推理 + argmax
pub struct DigitClassifier {
    model: Arc<dyn DigitModel>,
    preprocess: PreprocessConfig,
    num_classes: usize,
}

impl DigitClassifier {
    pub fn new(model: Arc<dyn DigitModel>, preprocess: PreprocessConfig, num_classes: usize) -> Self {
        Self {
            model,
            preprocess,
            num_classes,
        }
    }

    pub fn classify(&self, image_bytes: &[u8]) -> Result<u8, ClassifyError> {
        let input = to_input_tensor(image_bytes, &self.preprocess)?;

        let scores = self
            .model
            .scores(&input)
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        if scores.len() != self.num_classes {
            return Err(ClassifyError::Output(format!(
                "expected {} class scores, got {}",
                self.num_classes,
                scores.len()
            )));
        }

        let digit = argmax(&scores)
            .ok_or_else(|| ClassifyError::Output("empty score vector".to_string()))?;
        debug!(digit, scores = ?scores, "Digit classified");

        u8::try_from(digit).map_err(|_| ClassifyError::Output(format!("class index {} out of range", digit)))
    }
}
