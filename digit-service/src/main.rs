//! 数字识别服务主程序入口

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use modelserve_digit::http_server::{self, ServerState};
use modelserve_digit::{Config, DigitClassifier, OnnxDigitModel};

mod logging_config;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging_config::init_logging("digit-service.log").map_err(|e| {
        eprintln!("ERROR: {}", e);
        e
    })?;

    let config = Config::load()?;
    info!("Config loaded: {:?}", config);

    let model = OnnxDigitModel::load(&config.model.model_path())?;
    let classifier = DigitClassifier::new(
        Arc::new(model),
        config.preprocess.clone(),
        config.model.num_classes,
    );

    if config.cors.enabled {
        warn!("CORS is open to every origin, method and header");
    }

    let state = ServerState {
        classifier: Arc::new(classifier),
    };

    http_server::start_server(&config.server, &config.cors, state).await
}
