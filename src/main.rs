mod app;
mod config;
mod data;
mod ui;

use app::{App, ChartViewController};
use config::{config_path, load_config, save_config};
use data::BackendClient;
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use ui::Theme;

const LOG_FILE: &str = "klineview.log";

fn init_tracing() -> color_eyre::Result<()> {
    // stdout belongs to the terminal UI
    let file = File::create(LOG_FILE)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("klineview=info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let path = config_path();
    let mut config = load_config(&path);
    tracing::info!(api = %config.api_base_url, timeframe = config.timeframe.as_str(), "starting");

    let client = BackendClient::new(&config.api_base_url, config.request_timeout())?;
    let mut controller = ChartViewController::new(
        config.timeframe,
        Theme::from_dark(config.dark),
        config.controller_settings(),
    );
    controller.prefer_exchange(config.last_exchange.clone());

    let mut app = App::new(controller, client);
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal).await;
    ratatui::restore();

    let controller = app.controller();
    config.timeframe = controller.controls.timeframe.current();
    config.dark = controller.theme.dark;
    if let Some(exchange) = controller.controls.exchange.value() {
        config.last_exchange = Some(exchange.to_string());
    }
    if let Err(err) = save_config(&path, &config) {
        tracing::warn!(error = %err, "failed to save config");
    }

    tracing::info!("shutting down");
    result
}
