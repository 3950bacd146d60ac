use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;

pub struct CliContext {
    settings: Arc<Settings>,
    config_path: PathBuf,
    from_file: bool,
}

impl CliContext {
    pub fn new(settings: Settings, config_path: PathBuf, from_file: bool) -> Self {
        Self {
            settings: Arc::new(settings),
            config_path,
            from_file,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Whether `config_path` existed when settings were loaded.
    pub fn from_file(&self) -> bool {
        self.from_file
    }
}
