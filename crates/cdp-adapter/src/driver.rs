use crate::{
    config::CdpConfig,
    error::{driver_error, AdapterError},
    scripts,
};
use action_primitives::{ActionError, PageDriver};
use async_trait::async_trait;
use chromiumoxide::{
    browser::{Browser, BrowserConfig},
    cdp::browser_protocol::page::CaptureScreenshotFormat,
    element::Element,
    page::ScreenshotParams,
    Page,
};
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};
use tracing::{debug, info, warn};

const DEFAULT_ARGS: &[&str] = &[
    "--disable-background-networking",
    "--disable-breakpad",
    "--disable-component-update",
    "--disable-default-apps",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-sync",
    "--no-first-run",
    "--no-default-browser-check",
    "--password-store=basic",
    "--use-mock-keychain",
];

#[derive(Debug, Deserialize)]
struct PageActivity {
    ready_state: String,
    quiet_for_ms: f64,
}

/// One Chromium process driving a single page.
pub struct ChromiumPageDriver {
    browser: Mutex<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
    config: CdpConfig,
}

impl ChromiumPageDriver {
    /// Launch Chromium, start the CDP handler loop and open a blank page.
    pub async fn launch(config: CdpConfig) -> Result<Self, AdapterError> {
        let browser_config = browser_config(&config)?;
        info!(headless = config.headless, "Launching chromium");

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(AdapterError::Launch)?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(target: "cdp-adapter", ?err, "cdp handler event error");
                }
            }
            debug!(target: "cdp-adapter", "cdp handler loop ended");
        });

        let page = browser.new_page("about:blank").await?;
        info!("Chromium ready");

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler_task,
            config,
        })
    }

    /// Close the browser and wait for the process to exit.
    pub async fn close(&self) -> Result<(), AdapterError> {
        let mut browser = self.browser.lock().await;
        browser.close().await?;
        if let Err(err) = browser.wait().await {
            warn!(target: "cdp-adapter", "waiting for chromium exit failed: {}", err);
        }
        self.handler_task.abort();
        info!("Chromium closed");
        Ok(())
    }

    /// Poll for the first element matching `selector` until `timeout`.
    async fn locate(&self, selector: &str, timeout: Duration) -> Result<Element, ActionError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(err) => {
                    debug!(target: "cdp-adapter", selector, "element not yet present: {}", err)
                }
            }
            if Instant::now() >= deadline {
                return Err(selector_timeout(selector, timeout));
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    async fn is_visible(element: &Element) -> bool {
        match element.call_js_fn(scripts::IS_VISIBLE, false).await {
            Ok(returns) => returns
                .result
                .value
                .and_then(|value| value.as_bool())
                .unwrap_or(false),
            Err(err) => {
                debug!(target: "cdp-adapter", "visibility check failed: {}", err);
                false
            }
        }
    }

    async fn page_activity(&self) -> Option<PageActivity> {
        let result = match self.page.evaluate(scripts::PAGE_ACTIVITY).await {
            Ok(result) => result,
            Err(err) => {
                debug!(target: "cdp-adapter", "page activity check failed: {}", err);
                return None;
            }
        };
        result.into_value::<PageActivity>().ok()
    }
}

impl Drop for ChromiumPageDriver {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl PageDriver for ChromiumPageDriver {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ActionError> {
        debug!(target: "cdp-adapter", url, "Navigating");
        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| {
                ActionError::Timeout(format!(
                    "navigation to {} exceeded {}ms",
                    url,
                    timeout.as_millis()
                ))
            })?
            .map_err(|err| ActionError::Navigation(format!("{url}: {err}")))?;
        Ok(())
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), ActionError> {
        let deadline = Instant::now() + timeout;
        let quiet_ms = self.config.network_quiet().as_millis() as f64;
        loop {
            if let Some(activity) = self.page_activity().await {
                if activity.ready_state == "complete" && activity.quiet_for_ms >= quiet_ms {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(ActionError::Timeout(format!(
                    "network idle exceeded {}ms",
                    timeout.as_millis()
                )));
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    async fn current_dom(&self) -> Result<String, ActionError> {
        self.page
            .content()
            .await
            .map_err(|err| driver_error("page content", err))
    }

    async fn current_url(&self) -> Result<String, ActionError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|err| driver_error("page url", err))?;
        Ok(url.unwrap_or_default())
    }

    async fn fill(
        &self,
        selector: &str,
        value: &str,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        let element = self.locate(selector, timeout).await?;
        element
            .call_js_fn(scripts::CLEAR_VALUE, false)
            .await
            .map_err(|err| driver_error("clear input", err))?;
        element
            .click()
            .await
            .map_err(|err| driver_error("focus input", err))?;
        element
            .type_str(value)
            .await
            .map_err(|err| driver_error("type text", err))?;
        Ok(())
    }

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), ActionError> {
        let element = self.locate(selector, timeout).await?;
        element
            .click()
            .await
            .map_err(|err| driver_error("click", err))?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), ActionError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                if Self::is_visible(&element).await {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(selector_timeout(selector, timeout));
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    async fn inner_text(&self, selector: &str, timeout: Duration) -> Result<String, ActionError> {
        let element = self.locate(selector, timeout).await?;
        let text = element
            .inner_text()
            .await
            .map_err(|err| driver_error("inner text", err))?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ActionError> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|err| driver_error("screenshot", err))
    }
}

fn browser_config(config: &CdpConfig) -> Result<BrowserConfig, AdapterError> {
    let executable = config
        .resolve_executable()
        .ok_or(AdapterError::ExecutableNotFound)?;
    let (width, height) = config.window;

    let mut builder = BrowserConfig::builder()
        .chrome_executable(executable)
        .window_size(width, height)
        .request_timeout(Duration::from_millis(config.request_timeout_ms))
        .launch_timeout(Duration::from_millis(config.launch_timeout_ms));

    if !config.headless {
        builder = builder.with_head();
    }
    if config.no_sandbox {
        builder = builder.no_sandbox();
    }
    if let Some(dir) = &config.user_data_dir {
        builder = builder.user_data_dir(dir);
    }

    let args = DEFAULT_ARGS
        .iter()
        .map(|arg| arg.to_string())
        .chain(config.launch_args.iter().cloned());
    builder.args(args).build().map_err(AdapterError::Config)
}

fn selector_timeout(selector: &str, timeout: Duration) -> ActionError {
    ActionError::Timeout(format!(
        "waiting for selector '{}' exceeded {}ms",
        selector,
        timeout.as_millis()
    ))
}
