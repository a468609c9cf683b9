use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub model_file: PathBuf,
    /// 模型输出的类别数
    #[serde(default = "default_num_classes")]
    pub num_classes: usize,
}

/// 缩放插值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_resize_filter")]
    pub resize_filter: ResizeFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 允许任意来源、方法、请求头
    pub enabled: bool,
    /// 允许携带凭据（此时回显请求来源，而不是返回 `*`）
    pub allow_credentials: bool,
}

fn default_num_classes() -> usize {
    10
}

fn default_resize_filter() -> ResizeFilter {
    // 与训练时图片库 resize 的默认插值（双三次）一致
    ResizeFilter::CatmullRom
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("./models"),
            model_file: PathBuf::from("digit_model.onnx"),
            num_classes: default_num_classes(),
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            width: 28,
            height: 28,
            resize_filter: default_resize_filter(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_credentials: true,
        }
    }
}

impl ModelConfig {
    pub fn model_path(&self) -> PathBuf {
        if self.model_file.is_absolute() {
            self.model_file.clone()
        } else {
            self.models_dir.join(&self.model_file)
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = PathBuf::from("config.toml");

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
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

    /// 环境变量覆盖：MODELS_DIR、DIGIT_SERVICE_PORT
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("MODELS_DIR") {
            self.model.models_dir = PathBuf::from(dir);
        }
        if let Some(port) = std::env::var("DIGIT_SERVICE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            self.server.port = port;
        }
    }
}
