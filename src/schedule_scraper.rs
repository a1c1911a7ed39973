use std::ops::Range;

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::time::sleep;

use crate::{
    browser::{Browser, BrowserError, TAB_LABELS_SCRIPT},
    events::{CrawlEvent, EventSink},
    schedule_item::ScheduleItem,
    scraping_context::ScrapingContext,
    scroll_controller::scroll_tab,
    text_manipulators::first_line,
};

const TODAY_MARKER: &str = "오늘";
const TAB_SELECTOR: &str = "button";
const FILTER_SELECTOR: &str = "button, a";

#[derive(Debug)]
pub enum TabActivation {
    Activated,
    NotFound,
    Failed(BrowserError),
}

#[derive(Debug)]
pub enum FilterActivation {
    Applied,
    NotFound,
    Disabled,
    Failed(BrowserError),
}

/// The tabs to crawl: `window` tabs starting at the first "today" tab, or
/// at the first tab when there is none.
pub fn tab_window(labels: &[String], window: usize) -> Range<usize> {
    let start = labels
        .iter()
        .position(|label| label.contains(TODAY_MARKER))
        .unwrap_or(0)
        .min(labels.len());
    start..start.saturating_add(window).min(labels.len())
}

pub async fn discover_tabs<B: Browser>(browser: &mut B) -> Vec<String> {
    match browser.evaluate(TAB_LABELS_SCRIPT).await {
        Ok(Value::Array(labels)) => labels
            .iter()
            .filter_map(Value::as_str)
            .map(|label| label.trim().to_string())
            .collect(),
        Ok(other) => {
            warn!("Tab discovery returned {other}, expected a list of labels");
            vec![]
        }
        Err(e) => {
            warn!("Tab discovery failed: {e}");
            vec![]
        }
    }
}

pub async fn activate_tab<B: Browser>(browser: &mut B, label: &str) -> TabActivation {
    match browser.click_labelled(TAB_SELECTOR, first_line(label), false).await {
        Ok(true) => TabActivation::Activated,
        Ok(false) => TabActivation::NotFound,
        Err(e) => TabActivation::Failed(e),
    }
}

pub async fn activate_filter<B: Browser>(
    browser: &mut B,
    filter_label: Option<&str>,
) -> FilterActivation {
    let Some(filter_label) = filter_label else {
        return FilterActivation::Disabled;
    };
    match browser.click_labelled(FILTER_SELECTOR, filter_label, true).await {
        Ok(true) => FilterActivation::Applied,
        Ok(false) => FilterActivation::NotFound,
        Err(e) => FilterActivation::Failed(e),
    }
}

/// Crawls one date tab. A tab that can't be activated yields nothing.
pub async fn scrape_tab<B: Browser>(
    browser: &mut B,
    context: &ScrapingContext,
    index: usize,
    label: &str,
    today: NaiveDate,
    sink: &EventSink,
) -> Vec<ScheduleItem> {
    let config = &context.crawl_config;
    let display_label = label.replace('\n', " ");
    info!("Collecting {display_label}");
    sink.emit(CrawlEvent::TabStarted {
        index,
        label: label.to_string(),
    });

    let reason = match activate_tab(browser, label).await {
        TabActivation::Activated => None,
        TabActivation::NotFound => Some("tab button not found".to_string()),
        TabActivation::Failed(e) => Some(e.to_string()),
    };
    if let Some(reason) = reason {
        warn!("Skipping tab {display_label}: {reason}");
        sink.emit(CrawlEvent::TabSkipped {
            index,
            label: label.to_string(),
            reason,
        });
        return vec![];
    }
    sleep(config.tab_settle).await;

    match activate_filter(browser, config.filter_label.as_deref()).await {
        FilterActivation::Applied => sleep(config.filter_settle).await,
        FilterActivation::NotFound => debug!("No category filter on {display_label}"),
        FilterActivation::Disabled => {}
        FilterActivation::Failed(e) => debug!("Category filter failed on {display_label}: {e}"),
    }

    let results = scroll_tab(browser, context, index, label, today, sink).await;
    info!("{display_label}: {} broadcasts collected", results.len());
    sink.emit(CrawlEvent::TabFinished {
        index,
        label: label.to_string(),
        items: results.len(),
    });
    results.into_items()
}

/// Opens the schedule page and crawls the week starting today.
///
/// Never fails: a page that can't be opened gives an empty schedule, and
/// tabs that break are skipped.
pub async fn crawl<B: Browser>(
    browser: &mut B,
    url: &str,
    context: &ScrapingContext,
    today: NaiveDate,
    sink: EventSink,
) -> Vec<ScheduleItem> {
    let config = &context.crawl_config;
    info!("Opening {url}");
    if let Err(e) = browser.goto(url, config.navigation_timeout).await {
        error!("Failed to open schedule page: {e}");
        sink.emit(CrawlEvent::RunFinished { total: 0 });
        return vec![];
    }
    sleep(config.page_settle).await;

    let labels = discover_tabs(browser).await;
    let window = tab_window(&labels, config.tab_window);
    info!("Found {} date tabs, crawling {:?}", labels.len(), window);
    sink.emit(CrawlEvent::TabsDiscovered {
        labels: labels.clone(),
        start: window.start,
    });

    let mut schedule = vec![];
    for index in window {
        let items = scrape_tab(browser, context, index, &labels[index], today, &sink).await;
        schedule.extend(items);
    }

    sink.emit(CrawlEvent::RunFinished {
        total: schedule.len(),
    });
    schedule
}
