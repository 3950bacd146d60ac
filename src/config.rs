//! Run configuration
//!
//! `Settings` is read from YAML, then selected fields are overridden from
//! `SWAGLABS_*` environment variables. Every field has a default so an
//! empty or missing file is a valid configuration.

use action_retry::RetryPolicy;
use browser_port::ChromiumConfig;
use clap::ValueEnum;
use page_objects::{PageSettings, SiteUrls, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_BASE_URL: &str = "SWAGLABS_BASE_URL";
pub const ENV_HEADLESS: &str = "SWAGLABS_HEADLESS";
pub const ENV_WORKERS: &str = "SWAGLABS_WORKERS";
pub const ENV_CHROME: &str = "SWAGLABS_CHROME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which browser implementation backs each test case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-memory storefront simulation
    #[default]
    Sim,
    /// Real Chromium over the DevTools protocol
    Chromium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: RetryPolicy::DEFAULT_MAX_RETRIES,
            base_delay_ms: RetryPolicy::DEFAULT_BASE_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub backend: Backend,
    pub action_timeout_ms: u64,
    pub expect_timeout_ms: u64,
    /// Budget for one whole test case
    pub test_timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub retry: RetrySettings,
    pub workers: usize,
    pub screenshot_dir: PathBuf,
    pub browser: ChromiumConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            backend: Backend::Sim,
            action_timeout_ms: 5_000,
            expect_timeout_ms: 5_000,
            test_timeout_ms: 60_000,
            settle_delay_ms: 100,
            retry: RetrySettings::default(),
            workers: 4,
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            browser: ChromiumConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply `SWAGLABS_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_HEADLESS) {
            self.browser.headless = parse_bool(&raw).ok_or(ConfigError::InvalidEnv {
                var: ENV_HEADLESS,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_WORKERS) {
            self.workers = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidEnv {
                    var: ENV_WORKERS,
                    value: raw.clone(),
                })?;
        }
        if let Some(path) = lookup(ENV_CHROME).filter(|v| !v.trim().is_empty()) {
            self.browser.executable = Some(PathBuf::from(path.trim()));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        for (name, value) in [
            ("action_timeout_ms", self.action_timeout_ms),
            ("expect_timeout_ms", self.expect_timeout_ms),
            ("test_timeout_ms", self.test_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        self.retry_policy().map(|_| ())
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        RetryPolicy::from_millis(self.retry.max_retries, self.retry.base_delay_ms)
            .map_err(|err| ConfigError::Invalid(format!("retry: {}", err)))
    }

    pub fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }

    /// Timeouts and URLs handed to the page objects.
    pub fn page_settings(&self) -> Result<PageSettings, ConfigError> {
        Ok(PageSettings {
            urls: SiteUrls::new(&self.base_url),
            action_timeout: Duration::from_millis(self.action_timeout_ms),
            expect_timeout: Duration::from_millis(self.expect_timeout_ms),
            retry: self.retry_policy()?,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            screenshot_dir: self.screenshot_dir.clone(),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.backend, Backend::Sim);
        let page = settings.page_settings().unwrap();
        assert_eq!(page.action_timeout, Duration::from_millis(5000));
        assert_eq!(page.retry.max_retries(), 3);
        assert_eq!(page.retry.base_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let settings = Settings::from_yaml_str(
            "base_url: http://localhost:3000\nretry:\n  max_retries: 1\nbrowser:\n  headless: false\n",
        )
        .unwrap();
        assert_eq!(settings.base_url, "http://localhost:3000");
        assert_eq!(settings.retry.max_retries, 1);
        assert_eq!(settings.retry.base_delay_ms, 1000);
        assert!(!settings.browser.headless);
        assert_eq!(settings.workers, 4);
    }

    #[test]
    fn empty_document_is_default() {
        let settings = Settings::from_yaml_str("  \n").unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn overrides_win_over_file() {
        let mut settings = Settings::from_yaml_str("workers: 2\n").unwrap();
        settings
            .apply_overrides(vars(&[
                (ENV_BASE_URL, "http://127.0.0.1:8080/"),
                (ENV_HEADLESS, "off"),
                (ENV_WORKERS, "8"),
                (ENV_CHROME, "/opt/chrome/chrome"),
            ]))
            .unwrap();
        assert_eq!(settings.base_url, "http://127.0.0.1:8080/");
        assert!(!settings.browser.headless);
        assert_eq!(settings.workers, 8);
        assert_eq!(
            settings.browser.executable,
            Some(PathBuf::from("/opt/chrome/chrome"))
        );
    }

    #[test]
    fn bad_override_is_rejected() {
        let mut settings = Settings::default();
        let err = settings
            .apply_overrides(vars(&[(ENV_WORKERS, "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: ENV_WORKERS, .. }));

        let err = settings
            .apply_overrides(vars(&[(ENV_HEADLESS, "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_HEADLESS));
    }

    #[test]
    fn zero_retry_delay_fails_validation() {
        let settings = Settings::from_yaml_str("retry:\n  base_delay_ms: 0\n").unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn backend_parses_lowercase() {
        let settings = Settings::from_yaml_str("backend: chromium\n").unwrap();
        assert_eq!(settings.backend, Backend::Chromium);
    }
}
