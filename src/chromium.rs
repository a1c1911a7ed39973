use std::time::Duration;

use chromiumoxide::{
    Browser as Chromium, BrowserConfig, Page, handler::viewport::Viewport,
};
use futures::StreamExt;
use log::{debug, warn};
use serde_json::Value;
use tokio::{task::JoinHandle, time::timeout};

use crate::browser::{Browser, BrowserError};

const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";

/// A single chromium tab dressed up as a phone, which is what the mobile
/// schedule page expects.
pub struct ChromiumBrowser {
    browser: Chromium,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumBrowser {
    pub async fn launch(headless: bool) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .window_size(390, 844)
            .viewport(Viewport {
                width: 390,
                height: 844,
                device_scale_factor: None,
                emulating_mobile: true,
                is_landscape: false,
                has_touch: true,
            })
            .arg(format!("--user-agent={MOBILE_USER_AGENT}"));
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Chromium::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        // The CDP connection only makes progress while its handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {e}");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(BrowserError::driver)?;
        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Shuts chromium down. Errors are logged, there is nothing left to do
    /// with them at this point.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {e}");
        }
        self.handler.abort();
    }
}

impl Browser for ChromiumBrowser {
    async fn goto(&mut self, url: &str, limit: Duration) -> Result<(), BrowserError> {
        match timeout(limit, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::driver(e)),
            Err(_) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout: limit,
            }),
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, BrowserError> {
        let result = self
            .page
            .evaluate_expression(script.to_string())
            .await
            .map_err(BrowserError::driver)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }
}
