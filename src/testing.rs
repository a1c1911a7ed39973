//! A scripted in-memory page for exercising the crawler without a browser.

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use serde_json::{Value, json};

use crate::{
    browser::{Browser, BrowserError, CONTAINERS_SCRIPT, TAB_LABELS_SCRIPT},
    config::CrawlConfig,
};

pub const FILTER_LABEL: &str = "TV쇼핑";

#[derive(Debug, Default)]
pub struct FakePage {
    pub tabs: Vec<String>,
    /// Container payloads per tab label, one per pass. The last one repeats.
    pub payloads: HashMap<String, Vec<Value>>,
    /// Scrolls per tab that still make the page taller.
    pub growth_per_tab: usize,
    pub fail_navigation: bool,
    pub fail_clicks: HashSet<String>,
    pub fail_extraction_passes: HashSet<usize>,
    pub fail_heights: bool,
    pub has_filter: bool,

    pub navigated: Vec<String>,
    pub clicked_tabs: Vec<String>,
    pub filter_clicks: usize,
    pub scrolls: usize,
    current_tab: Option<String>,
    tab_pass: usize,
    height: i64,
    growth_remaining: usize,
}

impl FakePage {
    pub fn with_tabs(tabs: &[&str]) -> Self {
        Self {
            tabs: tabs.iter().map(|t| t.to_string()).collect(),
            height: 1000,
            has_filter: true,
            ..Default::default()
        }
    }

    pub fn scrolls_for(&mut self, label: &str, payloads: Vec<Value>) {
        self.payloads.insert(label.to_string(), payloads);
    }

    fn next_payload(&mut self) -> Value {
        let pass = self.tab_pass;
        self.tab_pass += 1;
        self.current_tab
            .as_ref()
            .and_then(|tab| self.payloads.get(tab))
            .and_then(|payloads| payloads.get(pass).or(payloads.last()))
            .cloned()
            .unwrap_or_else(|| json!({ "containers": [] }))
    }
}

impl Browser for FakePage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.navigated.push(url.to_string());
        if self.fail_navigation {
            return Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            });
        }
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, BrowserError> {
        if script == TAB_LABELS_SCRIPT {
            return Ok(json!(self.tabs));
        }
        if script == CONTAINERS_SCRIPT {
            if self.fail_extraction_passes.contains(&self.tab_pass) {
                self.tab_pass += 1;
                return Err(BrowserError::UnexpectedPayload("detached frame".to_string()));
            }
            return Ok(self.next_payload());
        }
        Ok(Value::Null)
    }

    async fn scroll_by(&mut self, dy: i64) -> Result<(), BrowserError> {
        self.scrolls += 1;
        if self.growth_remaining > 0 {
            self.growth_remaining -= 1;
            self.height += dy;
        }
        Ok(())
    }

    async fn content_height(&mut self) -> Result<i64, BrowserError> {
        if self.fail_heights {
            return Err(BrowserError::UnexpectedPayload("no body".to_string()));
        }
        Ok(self.height)
    }

    async fn click_labelled(
        &mut self,
        _selector: &str,
        label: &str,
        _exact: bool,
    ) -> Result<bool, BrowserError> {
        if label == FILTER_LABEL {
            self.filter_clicks += 1;
            return Ok(self.has_filter);
        }
        self.clicked_tabs.push(label.to_string());
        if self.fail_clicks.contains(label) {
            return Err(BrowserError::UnexpectedPayload("click failed".to_string()));
        }
        let Some(tab) = self.tabs.iter().find(|t| t.contains(label)) else {
            return Ok(false);
        };
        self.current_tab = Some(tab.clone());
        self.tab_pass = 0;
        self.growth_remaining = self.growth_per_tab;
        Ok(true)
    }
}

/// Default tuning with every wait removed.
pub fn instant_config() -> CrawlConfig {
    CrawlConfig {
        navigation_timeout: Duration::from_secs(1),
        page_settle: Duration::ZERO,
        tab_settle: Duration::ZERO,
        filter_settle: Duration::ZERO,
        scroll_settle: Duration::ZERO,
        filter_label: Some(FILTER_LABEL.to_string()),
        ..CrawlConfig::default()
    }
}
