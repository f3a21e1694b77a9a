//! Suite configuration
//!
//! Loaded from YAML with the search order `--config`, `./config/storefront.yaml`,
//! `<config dir>/storefront-e2e/config.yaml`, then built-in defaults. Every
//! section is optional; missing keys keep their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use action_locator::ResolveOptions;
use action_primitives::{Backoff, RetryPolicy};
use cdp_adapter::BrowserSettings;
use serde::{Deserialize, Serialize};
use storefront_snapshot_store::CapturePolicy;
use tracing::{info, warn};

use crate::errors::SuiteError;

pub const LOCAL_CONFIG_PATH: &str = "config/storefront.yaml";
pub const PAGESPEED_KEY_ENV: &str = "PAGESPEED_API_KEY";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    pub site: SiteConfig,
    pub browser: BrowserSettings,
    pub timeouts: TimeoutConfig,
    pub retry: RetryConfig,
    pub artifacts: ArtifactConfig,
    pub report: ReportConfig,
    pub runner: RunnerConfig,
    pub pagespeed: PageSpeedConfig,
}

/// Storefront endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub products_url: String,
    pub cart_url: String,
    pub support_url: String,
    pub service_url: String,
    /// Search results page, queried with `?query=<keyword>`
    pub search_url: String,
    pub orders_url: String,
    /// Url pattern of the checkout page reached from the cart
    pub checkout_pattern: String,
    /// `<option>` value of the shipping method picked at checkout
    pub delivery_method: String,
    pub login_url: String,
    pub forgot_password_url: String,
    pub mailinator_url: String,
    /// Url pattern of the identity provider unauthenticated users are sent to
    pub auth_redirect_pattern: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mypod.io.vn/us".to_string(),
            products_url: "https://mypod.io.vn/us/products".to_string(),
            cart_url: "https://mypod.io.vn/us/cart".to_string(),
            support_url: "https://mypod.io.vn/us/support".to_string(),
            service_url: "https://mypod.io.vn/us/service".to_string(),
            search_url: "https://mypod.io.vn/us/search".to_string(),
            orders_url: "https://mypod.io.vn/us/orders".to_string(),
            checkout_pattern: r"/checkout\?checkout=".to_string(),
            delivery_method: "U2hpcHBpbmdNZXRob2Q6MTA=".to_string(),
            login_url: "https://accounts.mypodsoftware.io.vn/realms/keycloak/protocol/openid-connect/auth?response_type=code&client_id=zoomprints-saleor-client&scope=openid+profile+email+offline_access".to_string(),
            forgot_password_url: "https://accounts.mypodsoftware.io.vn/realms/keycloak/login-actions/reset-credentials?client_id=zoomprints-saleor-client".to_string(),
            mailinator_url: "https://www.mailinator.com/v4/public/inboxes.jsp".to_string(),
            auth_redirect_pattern: "/protocol/openid-connect/auth|/login".to_string(),
        }
    }
}

/// Timeouts in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Ceiling for a whole scenario
    pub step_ms: u64,
    pub navigation_ms: u64,
    /// Resolver budget for a single target
    pub resolve_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            step_ms: 120_000,
            navigation_ms: 30_000,
            resolve_ms: 10_000,
            poll_interval_ms: 100,
        }
    }
}

impl TimeoutConfig {
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::default()
            .with_budget(Duration::from_millis(self.resolve_ms))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms.max(1)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    pub per_attempt_ms: u64,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            per_attempt_ms: 5_000,
            backoff_base_ms: 200,
            backoff_cap_ms: 2_000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.attempts,
            Duration::from_millis(self.per_attempt_ms),
            Backoff::Exponential {
                base: Duration::from_millis(self.backoff_base_ms),
                cap: Duration::from_millis(self.backoff_cap_ms),
            },
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub dir: PathBuf,
    pub screenshot: bool,
    pub html: bool,
    /// Retention used by `artifacts sweep`, e.g. "7d"
    pub ttl: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results/artifacts"),
            screenshot: true,
            html: true,
            ttl: "7d".to_string(),
        }
    }
}

impl ArtifactConfig {
    pub fn capture_policy(&self) -> CapturePolicy {
        CapturePolicy {
            root: self.dir.clone(),
            screenshot: self.screenshot,
            html: self.html,
        }
    }

    pub fn ttl(&self) -> Result<Duration, SuiteError> {
        humantime::parse_duration(&self.ttl)
            .map_err(|err| SuiteError::Config(format!("artifacts.ttl '{}': {}", self.ttl, err)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub dir: PathBuf,
    /// Directory name of the per-worksheet result log
    pub workbook: String,
    pub backup_file: String,
    pub run_report_file: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
            workbook: "TestCaseResult".to_string(),
            backup_file: "test-results-backup.json".to_string(),
            run_report_file: "run-report.json".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn workbook_dir(&self) -> PathBuf {
        self.dir.join(&self.workbook)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.dir.join(&self.backup_file)
    }

    pub fn run_report_path(&self) -> PathBuf {
        self.dir.join(&self.run_report_file)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub parallel: usize,
    pub exclude_tags: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            parallel: 1,
            exclude_tags: vec!["skip".to_string()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpeedConfig {
    pub endpoint: String,
    pub threshold: f64,
    pub categories: Vec<String>,
    pub timeout_ms: u64,
    /// Read from `PAGESPEED_API_KEY`; never written back out
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for PageSpeedConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/pagespeedonline/v5/runPagespeed".to_string(),
            threshold: 0.8,
            categories: ["performance", "accessibility", "best-practices", "seo"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            timeout_ms: 120_000,
            api_key: None,
        }
    }
}

pub struct LoadedConfig {
    pub config: SuiteConfig,
    pub path: PathBuf,
}

/// Locate and parse the suite configuration.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig, SuiteError> {
    let (path, explicit) = match config_path {
        Some(path) => (path.clone(), true),
        None => (default_config_path(), false),
    };

    let mut config = if path.exists() {
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| SuiteError::Config(format!("failed to read {}: {}", path.display(), err)))?;
        let config = parse_config(&content)
            .map_err(|err| SuiteError::Config(format!("{}: {}", path.display(), err)))?;
        info!("Loaded configuration from: {}", path.display());
        config
    } else if explicit {
        return Err(SuiteError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    } else {
        warn!("Config file not found, using defaults: {}", path.display());
        SuiteConfig::default()
    };

    config.apply_env();
    Ok(LoadedConfig { config, path })
}

fn default_config_path() -> PathBuf {
    let local = PathBuf::from(LOCAL_CONFIG_PATH);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("storefront-e2e").join("config.yaml"))
        .unwrap_or(local)
}

pub fn parse_config(content: &str) -> Result<SuiteConfig, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(SuiteConfig::default());
    }
    serde_yaml::from_str(content)
}

impl SuiteConfig {
    /// Pull secrets from the environment.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(PAGESPEED_KEY_ENV) {
            if !key.trim().is_empty() {
                self.pagespeed.api_key = Some(key.trim().to_string());
            }
        }
    }

    /// Resolve relative report and artifact dirs against `root`.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        if self.artifacts.dir.is_relative() {
            self.artifacts.dir = root.join(&self.artifacts.dir);
        }
        if self.report.dir.is_relative() {
            self.report.dir = root.join(&self.report.dir);
        }
        self
    }
}
