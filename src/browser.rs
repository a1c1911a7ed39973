use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Collects every date tab button label, trimmed, in document order.
pub const TAB_LABELS_SCRIPT: &str = r#"(() => {
    let btns = Array.from(document.querySelectorAll('button'));
    return btns
        .filter(b => (b.innerText.includes('오늘') || /\d+/.test(b.innerText)) && b.innerText.length < 15)
        .map(b => b.innerText.trim());
})()"#;

/// Snapshot of every schedule container currently rendered. Marker and code
/// parsing happens on the Rust side, see `fragment::FragmentExtractor`.
pub const CONTAINERS_SCRIPT: &str = r#"(() => {
    let containers = Array.from(document.querySelectorAll('[data-time], ._1jauv3p0'));
    return {
        containers: containers.map(c => ({
            dataTime: c.getAttribute('data-time'),
            text: c.innerText || '',
            links: Array.from(c.querySelectorAll('a[href*="slitmCd="], [data-slitm-cd]')).map(l => ({
                code: l.getAttribute('data-slitm-cd'),
                href: l.getAttribute('href'),
                text: l.innerText || '',
            })),
        })),
    };
})()"#;

const CLICK_SCRIPT: &str = r#"((selector, label, exact) => {
    let btns = Array.from(document.querySelectorAll(selector));
    let target = btns.find(b => exact ? b.innerText.trim() === label : b.innerText.includes(label));
    if (!target) {
        target = btns.find(b => b.innerText.includes(label));
    }
    if (target) {
        target.click();
        return true;
    }
    return false;
})"#;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("navigation to {url} timed out after {}s", .timeout.as_secs())]
    NavigationTimeout { url: String, timeout: Duration },
    #[error("page script returned an unexpected payload: {0}")]
    UnexpectedPayload(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("browser driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BrowserError {
    pub fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        BrowserError::Driver(Box::new(err))
    }
}

/// The capabilities the crawler needs from a live page.
///
/// Implementors only have to provide navigation and script evaluation; the
/// remaining operations are expressed as scripts by default, but can be
/// overridden when a driver has a native way of doing them.
#[allow(async_fn_in_trait)]
pub trait Browser {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Evaluates a JavaScript expression and returns its value by value.
    async fn evaluate(&mut self, script: &str) -> Result<Value, BrowserError>;

    async fn scroll_by(&mut self, dy: i64) -> Result<(), BrowserError> {
        self.evaluate(&format!("window.scrollBy(0, {dy})")).await?;
        Ok(())
    }

    async fn content_height(&mut self) -> Result<i64, BrowserError> {
        let value = self.evaluate("document.body.scrollHeight").await?;
        value
            .as_f64()
            .map(|height| height as i64)
            .ok_or_else(|| BrowserError::UnexpectedPayload(format!("scrollHeight was {value}")))
    }

    /// Clicks the first element matching `selector` whose visible text
    /// matches `label`. Returns whether such an element was found.
    async fn click_labelled(
        &mut self,
        selector: &str,
        label: &str,
        exact: bool,
    ) -> Result<bool, BrowserError> {
        let script = format!(
            "{CLICK_SCRIPT}({}, {}, {exact})",
            serde_json::to_string(selector)?,
            serde_json::to_string(label)?,
        );
        let value = self.evaluate(&script).await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}
