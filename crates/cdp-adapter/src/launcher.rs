//! Per-scenario Chromium processes

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use storefront_core_types::{BrowserFactory, DriverError, PageRef};
use tracing::{debug, info};

use crate::config::BrowserSettings;
use crate::errors::map_cdp_error;
use crate::page::ChromiumPage;

/// Launches one isolated Chromium process per opened page.
#[derive(Clone, Debug, Default)]
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    fn browser_config(&self) -> Result<BrowserConfig, DriverError> {
        let settings = &self.settings;
        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(settings.request_timeout_ms))
            .launch_timeout(Duration::from_secs(20))
            .window_size(settings.window_width, settings.window_height)
            // fresh temporary profile per launch
            .incognito();

        if !settings.headless {
            builder = builder.with_head();
        }
        if settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = settings.resolve_executable() {
            builder = builder.chrome_executable(executable);
        }

        let mut args = vec![
            "--disable-background-networking".to_string(),
            "--disable-default-apps".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-extensions".to_string(),
            "--disable-popup-blocking".to_string(),
            "--disable-sync".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
        ];
        args.extend(settings.extra_args.iter().cloned());
        builder = builder.args(args);

        builder
            .build()
            .map_err(|err| DriverError::Unsupported(format!("browser config error: {err}")))
    }
}

#[async_trait]
impl BrowserFactory for ChromiumLauncher {
    async fn open_page(&self) -> Result<PageRef, DriverError> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config).await.map_err(map_cdp_error)?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "browser handler error");
                }
            }
            debug!("browser handler ended");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(err) => {
                handler_task.abort();
                return Err(map_cdp_error(err));
            }
        };
        info!(
            headless = self.settings.headless,
            width = self.settings.window_width,
            height = self.settings.window_height,
            "Chromium page opened"
        );

        let page = ChromiumPage::attach(browser, handler_task, page).await?;
        Ok(Arc::new(page))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}
