use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;

pub fn init_logging(level: &str, debug: bool, json: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    // Reports go to stdout, so logs stay on stderr.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

pub struct LoadedConfig {
    pub settings: Settings,
    pub path: PathBuf,
    pub from_file: bool,
}

/// Where settings are read from when `--config` is not given.
pub fn default_config_path() -> Result<PathBuf> {
    // Priority: ./config/swaglabs.yaml > ~/.config/swaglabs/config.yaml
    let local_config = PathBuf::from("config/swaglabs.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("swaglabs");
    path.push("config.yaml");
    Ok(path)
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    let from_file = config_path.exists();
    let mut settings = if from_file {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;
        let settings = Settings::from_yaml_str(&content).context("Failed to parse config file")?;
        info!("Loaded configuration from: {}", config_path.display());
        settings
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Settings::default()
    };

    settings
        .apply_env_overrides()
        .context("Invalid environment override")?;
    settings.validate().context("Invalid configuration")?;

    Ok(LoadedConfig {
        settings,
        path: config_path,
        from_file,
    })
}
