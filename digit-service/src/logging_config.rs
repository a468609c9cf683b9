//! 日志配置模块
//! 支持从配置文件加载模块级别的日志设置，并合并环境变量的设置

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 默认日志级别（如果模块未指定）
    #[serde(default = "default_log_level")]
    pub default_level: String,

    /// 模块级别的日志设置
    /// key: 模块名称（如 "modelserve_digit::classifier"）
    /// value: 日志级别（如 "debug", "info", "warn", "error"）
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    /// 从配置文件加载日志配置
    /// 配置文件路径固定为：config/observability.json（相对于服务运行目录）
    pub fn load() -> Self {
        Self::load_from(Path::new("config/observability.json"))
    }

    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str::<LoggingConfig>(&content) {
                    Ok(config) => {
                        // 此时日志系统尚未初始化
                        println!("Loaded logging config: {:?}", config_path);
                        return config;
                    }
                    Err(e) => {
                        eprintln!("Failed to parse logging config {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    eprintln!("Failed to read logging config {:?}: {}", config_path, e);
                }
            }
        }

        LoggingConfig::default()
    }

    /// 构建 EnvFilter
    /// 优先级：环境变量 RUST_LOG > 配置文件 > 默认值
    pub fn build_env_filter(&self) -> EnvFilter {
        if std::env::var("RUST_LOG").is_ok() {
            return EnvFilter::from_default_env();
        }

        let mut filter_parts = vec![self.default_level.clone()];
        for (module, level) in &self.modules {
            filter_parts.push(format!("{}={}", module, level));
        }

        EnvFilter::try_new(filter_parts.join(","))
            .unwrap_or_else(|_| EnvFilter::new(self.default_level.clone()))
    }
}

/// 初始化日志：JSON 文件日志（按 5MB 轮转，保留 5 个）+ 终端 INFO 日志
///
/// 返回的 guard 必须在进程生命周期内持有，否则缓冲区中的日志会丢失。
pub fn init_logging(log_file_name: &str) -> anyhow::Result<WorkerGuard> {
    let log_dir = PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create logs directory {:?}: {}", log_dir, e))?;

    let env_filter = LoggingConfig::load().build_env_filter();

    let rotating_appender = FileRotate::new(
        log_dir.join(log_file_name),
        AppendTimestamp::default(FileLimit::MaxFiles(5)),
        ContentLimit::Bytes(5 * 1024 * 1024),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    let (non_blocking_appender, guard) = non_blocking(rotating_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(non_blocking_appender)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .json()
        .with_filter(env_filter);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .with_filter(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(guard)
}
