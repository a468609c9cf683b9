use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// 输入特征归一化模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputScalingMode {
    /// 每个请求单独拟合（与旧服务行为一致，结果退化为常量）
    PerRequest,
    /// 加载训练时的统计量（需要 input_scaler_file）
    Fitted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// 工件目录，相对路径的模型/缩放器文件都基于此目录
    pub models_dir: PathBuf,
    pub model_file: PathBuf,
    pub output_scaler_file: PathBuf,
    #[serde(default = "default_input_scaling")]
    pub input_scaling: InputScalingMode,
    #[serde(default)]
    pub input_scaler_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 为 true 时，校验/内部错误按旧行为以 200 返回 `{"error": ...}`
    #[serde(default)]
    pub legacy_error_status: bool,
}

fn default_input_scaling() -> InputScalingMode {
    InputScalingMode::PerRequest
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("./models"),
            model_file: PathBuf::from("price_model.onnx"),
            output_scaler_file: PathBuf::from("price_scaler.json"),
            input_scaling: default_input_scaling(),
            input_scaler_file: None,
        }
    }
}

impl ModelConfig {
    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.models_dir.join(file)
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.resolve(&self.model_file)
    }

    pub fn output_scaler_path(&self) -> PathBuf {
        self.resolve(&self.output_scaler_file)
    }

    pub fn input_scaler_path(&self) -> Option<PathBuf> {
        self.input_scaler_file.as_deref().map(|f| self.resolve(f))
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = PathBuf::from("config.toml");

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            // 使用默认配置
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 环境变量覆盖：MODELS_DIR、PRICE_SERVICE_PORT
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("MODELS_DIR") {
            self.model.models_dir = PathBuf::from(dir);
        }
        if let Some(port) = std::env::var("PRICE_SERVICE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            self.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [model]
            models_dir = "/srv/artifacts"
            model_file = "house.onnx"
            output_scaler_file = "/etc/scalers/price.json"
            input_scaling = "fitted"
            input_scaler_file = "features.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 5000);
        assert!(!config.api.legacy_error_status);
        assert_eq!(config.model.input_scaling, InputScalingMode::Fitted);
        assert_eq!(config.model.model_path(), PathBuf::from("/srv/artifacts/house.onnx"));
        assert_eq!(
            config.model.output_scaler_path(),
            PathBuf::from("/etc/scalers/price.json")
        );
        assert_eq!(
            config.model.input_scaler_path(),
            Some(PathBuf::from("/srv/artifacts/features.json"))
        );
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.model.input_scaling, InputScalingMode::PerRequest);
        assert_eq!(config.model.model_path(), PathBuf::from("./models/price_model.onnx"));
        assert!(config.model.input_scaler_path().is_none());
    }
}
