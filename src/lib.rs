pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::summary::OutputFormat;
use crate::core::config::AppConfig;
use crate::core::{RateMetric, Window};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Overrides applied on top of the configuration for a summary run.
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    pub days: Option<u32>,
    pub format: OutputFormat,
    pub metric: Option<RateMetric>,
}

pub enum AppCommand {
    Summary(SummaryOptions),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxstats starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Summary(options) => {
            let today = chrono::Local::now().date_naive();
            let window = Window::lookback(today, options.days.unwrap_or(config.window_days))?;
            let provider = Arc::new(providers::CbrProvider::new(&config.providers.cbr)?);

            cli::summary::run(
                provider,
                &window,
                options.metric.unwrap_or(config.metric),
                options.format,
            )
            .await
        }
    }
}
