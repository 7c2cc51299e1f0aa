use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{BrowserBuilder, BrowserConfig};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::page::Page;
use crate::session::{SessionLauncher, WebSession};

/// Chrome flags that cut startup time without changing page behavior.
const PERF_ARGS: &[&str] = &[
    "disable-extensions",
    "metrics-recording-only",
    "mute-audio",
    "no-default-browser-check",
    "no-first-run",
    "disable-client-side-phishing-detection",
    "disable-prompt-on-repost",
];

/// Starts one Chrome process per session.
pub struct ChromiumLauncher {
    config: BrowserConfig,
}

impl ChromiumLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    pub fn builder() -> BrowserBuilder {
        BrowserBuilder::new()
    }

    fn chrome_config(&self) -> Result<CrBrowserConfig> {
        let config = &self.config;
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        // chromiumoxide adds the `--` prefix itself
        for arg in PERF_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if let Some(ref dir) = config.user_data_dir {
            builder = builder.user_data_dir(dir);
        }

        builder = builder.viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });

        builder.build().map_err(Error::LaunchError)
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self) -> Result<ChromiumSession> {
        let (mut browser, mut handler) = CrBrowser::launch(self.chrome_config()?)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let cr_page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                if let Err(shutdown_err) = shut_down(&mut browser, &handler_task).await {
                    warn!(error = %shutdown_err, "failed to shut down chrome after launch error");
                }
                return Err(Error::NavigationError(e.to_string()));
            }
        };

        debug!("chrome session started");
        Ok(ChromiumSession {
            browser,
            page: Page::new(cr_page),
            _handler_task: handler_task,
        })
    }
}

/// A running Chrome with the single tab the pipeline works in.
pub struct ChromiumSession {
    browser: CrBrowser,
    page: Page,
    _handler_task: JoinHandle<()>,
}

#[async_trait]
impl WebSession for ChromiumSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await
    }

    async fn locate(&self, selector: &str, timeout: Duration) -> Result<Element> {
        self.page.wait_for_selector(selector, timeout).await
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await
    }

    async fn read_text(&self, element: &Element) -> Result<String> {
        element.inner_text().await
    }

    async fn read_attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        element.get_attribute(name).await
    }

    async fn tag_name(&self, element: &Element) -> Result<String> {
        element.tag_name().await
    }

    async fn clear(&self, element: &Element) -> Result<()> {
        element.clear().await
    }

    async fn type_text(&self, element: &Element, text: &str) -> Result<()> {
        element.type_text(text).await
    }

    async fn children(&self, element: &Element, selector: &str) -> Result<Vec<Element>> {
        element.find_elements(selector).await
    }

    async fn choose(&self, option: &Element) -> Result<()> {
        option.choose().await
    }

    async fn close(self) -> Result<()> {
        let ChromiumSession {
            mut browser,
            page,
            _handler_task: handler_task,
        } = self;

        if let Err(e) = page.close().await {
            warn!(error = %e, "failed to close tab");
        }
        shut_down(&mut browser, &handler_task).await?;
        debug!("chrome session closed");
        Ok(())
    }
}

/// Close Chrome, reap the process and stop the handler loop. Every step runs
/// even when an earlier one fails; the first failure is returned.
async fn shut_down(browser: &mut CrBrowser, handler_task: &JoinHandle<()>) -> Result<()> {
    let closed = browser.close().await.map(|_| ()).map_err(Error::CdpError);
    if let Err(e) = &closed {
        warn!(error = %e, "failed to close browser");
    }
    let waited = browser.wait().await.map(|_| ()).map_err(Error::IoError);
    if let Err(e) = &waited {
        warn!(error = %e, "failed to wait for chrome to exit");
    }
    handler_task.abort();
    closed.and(waited)
}
