//! Chromium-backed page

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::EventRequestWillBeSent;
use chromiumoxide::cdp::js_protocol::runtime::{EventConsoleApiCalled, EventExceptionThrown};
use chromiumoxide::element::Element;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use parking_lot::Mutex;
use storefront_core_types::{
    AnchorDescriptor, DriverError, ElementRef, PageDriver, PageEvent, PageEventKind,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::element::ChromiumElement;
use crate::errors::map_cdp_error;
use crate::lowering::{aria_xpath, text_xpath};

type EventBuffer = Arc<Mutex<Vec<PageEvent>>>;

/// Spawned tasks that are aborted unless handed over with `into_inner`.
struct ListenerTasks(Vec<JoinHandle<()>>);

impl ListenerTasks {
    fn push(&mut self, task: JoinHandle<()>) {
        self.0.push(task);
    }

    fn into_inner(mut self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut self.0)
    }
}

impl Drop for ListenerTasks {
    fn drop(&mut self) {
        for task in self.0.drain(..) {
            task.abort();
        }
    }
}

/// A page in its own Chromium process.
///
/// Closing the page aborts its event listeners and shuts the browser down.
pub struct ChromiumPage {
    page: Page,
    browser: tokio::sync::Mutex<Option<Browser>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    events: EventBuffer,
    closed: AtomicBool,
}

impl ChromiumPage {
    pub(crate) async fn attach(
        browser: Browser,
        handler: JoinHandle<()>,
        page: Page,
    ) -> Result<Self, DriverError> {
        let events: EventBuffer = Arc::default();
        // A failed listener setup drops the guard, aborting the handler too.
        let mut tasks = ListenerTasks(vec![handler]);

        let mut console = page
            .event_listener::<EventConsoleApiCalled>()
            .await
            .map_err(map_cdp_error)?;
        let sink = Arc::clone(&events);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = console.next().await {
                let text = event
                    .args
                    .iter()
                    .map(|arg| match &arg.value {
                        Some(serde_json::Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                        None => arg.description.clone().unwrap_or_default(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                let level = format!("{:?}", event.r#type).to_lowercase();
                sink.lock()
                    .push(PageEvent::now(PageEventKind::Console { level, text }));
            }
        }));

        let mut exceptions = page
            .event_listener::<EventExceptionThrown>()
            .await
            .map_err(map_cdp_error)?;
        let sink = Arc::clone(&events);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = exceptions.next().await {
                let details = &event.exception_details;
                let message = details
                    .exception
                    .as_ref()
                    .and_then(|ex| ex.description.clone())
                    .unwrap_or_else(|| details.text.clone());
                sink.lock()
                    .push(PageEvent::now(PageEventKind::PageError { message }));
            }
        }));

        let mut requests = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(map_cdp_error)?;
        let sink = Arc::clone(&events);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = requests.next().await {
                sink.lock().push(PageEvent::now(PageEventKind::Request {
                    method: event.request.method.clone(),
                    url: event.request.url.clone(),
                }));
            }
        }));

        Ok(Self {
            page,
            browser: tokio::sync::Mutex::new(Some(browser)),
            tasks: Mutex::new(tasks.into_inner()),
            events,
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(DriverError::Closed("page is closed".to_string()))
        } else {
            Ok(())
        }
    }

    async fn query_css(&self, selector: &str) -> Result<Vec<Element>, DriverError> {
        self.page
            .find_elements(selector)
            .await
            .or_else(|err| empty_when_missing(map_cdp_error(err)))
    }

    async fn query_xpath(&self, expr: &str) -> Result<Vec<Element>, DriverError> {
        self.page
            .find_xpaths(expr)
            .await
            .or_else(|err| empty_when_missing(map_cdp_error(err)))
    }
}

/// Zero matches surface from CDP as a lookup failure.
fn empty_when_missing(err: DriverError) -> Result<Vec<Element>, DriverError> {
    match err {
        DriverError::StaleElement(_) => Ok(Vec::new()),
        other => Err(other),
    }
}

fn wrap(anchor: &AnchorDescriptor, elements: Vec<Element>) -> Vec<ElementRef> {
    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            Arc::new(ChromiumElement::new(element, format!("{}[{}]", anchor, index))) as ElementRef
        })
        .collect()
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        info!(url, "Navigating");
        self.page.goto(url).await.map_err(map_cdp_error)?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.ensure_open()?;
        Ok(self
            .page
            .url()
            .await
            .map_err(map_cdp_error)?
            .unwrap_or_default())
    }

    async fn title(&self) -> Result<String, DriverError> {
        self.ensure_open()?;
        Ok(self
            .page
            .get_title()
            .await
            .map_err(map_cdp_error)?
            .unwrap_or_default())
    }

    async fn query_all(&self, anchor: &AnchorDescriptor) -> Result<Vec<ElementRef>, DriverError> {
        self.ensure_open()?;
        let elements = match anchor {
            AnchorDescriptor::Css(css) => self.query_css(css).await?,
            AnchorDescriptor::XPath(expr) => self.query_xpath(expr).await?,
            AnchorDescriptor::Text { content, exact } => {
                self.query_xpath(&text_xpath(content, *exact)).await?
            }
            AnchorDescriptor::Aria { role, name } => self.query_xpath(&aria_xpath(role, name)).await?,
            AnchorDescriptor::CssWithText { selector, text } => {
                let needle = text.to_lowercase();
                let mut kept = Vec::new();
                for element in self.query_css(selector).await? {
                    let inner = element
                        .inner_text()
                        .await
                        .map_err(map_cdp_error)?
                        .unwrap_or_default();
                    if inner.to_lowercase().contains(&needle) {
                        kept.push(element);
                    }
                }
                kept
            }
        };
        debug!(anchor = %anchor, matches = elements.len(), "query");
        Ok(wrap(anchor, elements))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        self.ensure_open()?;
        self.page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(map_cdp_error)
    }

    async fn html(&self) -> Result<String, DriverError> {
        self.ensure_open()?;
        self.page.content().await.map_err(map_cdp_error)
    }

    async fn drain_events(&self) -> Vec<PageEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    async fn close(&self) -> Result<(), DriverError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        self.events.lock().clear();

        if let Err(err) = self.page.clone().close().await {
            debug!(error = %err, "page close failed");
        }
        if let Some(mut browser) = self.browser.lock().await.take() {
            if let Err(err) = browser.close().await {
                warn!(error = %err, "browser close failed");
            }
            if let Err(err) = browser.wait().await {
                debug!(error = %err, "browser process wait failed");
            }
        }
        info!("Chromium page closed");
        Ok(())
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    fn parked_task() -> (JoinHandle<()>, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _alive = tx;
            futures::future::pending::<()>().await;
        });
        (task, rx)
    }

    #[tokio::test]
    async fn dropped_listener_tasks_are_aborted() {
        let (handler, handler_alive) = parked_task();
        let (console, console_alive) = parked_task();
        let mut tasks = ListenerTasks(vec![handler]);
        tasks.push(console);

        drop(tasks);

        assert!(handler_alive.await.is_err());
        assert!(console_alive.await.is_err());
    }

    #[tokio::test]
    async fn handed_over_tasks_keep_running() {
        let (handler, mut handler_alive) = parked_task();
        let tasks = ListenerTasks(vec![handler]).into_inner();

        tokio::task::yield_now().await;
        assert_eq!(handler_alive.try_recv(), Err(oneshot::error::TryRecvError::Empty));
        for task in tasks {
            task.abort();
        }
        assert!(handler_alive.await.is_err());
    }
}
