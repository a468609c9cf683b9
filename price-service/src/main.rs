//! 房价预测服务主程序入口

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::{info, warn};

use modelserve_price::config::InputScalingMode;
use modelserve_price::http_server::{self, ServerState};
use modelserve_price::{Config, InputScaling, MinMaxScaler, OnnxRegressor, PricePredictor};

mod logging_config;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging_config::init_logging("price-service.log").map_err(|e| {
        eprintln!("ERROR: {}", e);
        e
    })?;

    let config = Config::load()?;
    info!("Config loaded: {:?}", config);

    let regressor = OnnxRegressor::load(&config.model.model_path())?;
    let output_scaler = MinMaxScaler::from_file(&config.model.output_scaler_path())?;

    let input_scaling = match config.model.input_scaling {
        InputScalingMode::PerRequest => {
            warn!(
                "Input features are min-max scaled on each single request; every feature collapses \
                 to the lower bound of the range. Set model.input_scaling = \"fitted\" with an \
                 input_scaler_file holding the training statistics to score real inputs"
            );
            InputScaling::PerRequest
        }
        InputScalingMode::Fitted => {
            let path = config.model.input_scaler_path().ok_or_else(|| {
                anyhow!("model.input_scaling = \"fitted\" requires model.input_scaler_file")
            })?;
            InputScaling::Fitted(MinMaxScaler::from_file(&path)?)
        }
    };

    if config.api.legacy_error_status {
        warn!("Legacy error status enabled: validation and internal errors are answered with 200");
    }

    let predictor = PricePredictor::new(Arc::new(regressor), input_scaling, output_scaler)?;
    let state = ServerState {
        predictor: Arc::new(predictor),
        legacy_error_status: config.api.legacy_error_status,
    };

    http_server::start_server(&config.server, state).await
}
