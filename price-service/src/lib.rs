//! 房价预测推理服务库
//!
//! 表格特征 -> 派生特征 -> min-max 归一化 -> ONNX 回归模型 -> 反归一化价格

pub mod config;
pub mod error;
pub mod features;
pub mod http_server;
pub mod predictor;
pub mod regressor;
pub mod scaler;

// 重新导出主要类型
pub use config::Config;
pub use error::PredictError;
pub use features::{FeatureRow, HousingFeatures, EXPECTED_COLUMNS};
pub use predictor::{PricePrediction, PricePredictor};
pub use regressor::{OnnxRegressor, PriceRegressor};
pub use scaler::{InputScaling, MinMaxScaler};
