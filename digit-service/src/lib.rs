//! 手写数字识别推理服务库

pub mod classifier;
pub mod config;
pub mod error;
pub mod http_server;
pub mod model;
pub mod preprocess;

// 重新导出主要类型
pub use classifier::DigitClassifier;
pub use config::Config;
pub use error::ClassifyError;
pub use model::{DigitModel, OnnxDigitModel};
