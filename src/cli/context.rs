use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::SuiteConfig;

pub struct CliContext {
    config: Arc<SuiteConfig>,
    config_path: PathBuf,
}

impl CliContext {
    pub fn new(config: SuiteConfig, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
        }
    }

    pub fn config(&self) -> &SuiteConfig {
        self.config.as_ref()
    }

    pub fn shared_config(&self) -> Arc<SuiteConfig> {
        Arc::clone(&self.config)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
