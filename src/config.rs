use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

use crate::catalog::ReconcileMode;

const DEFAULT_SCHEDULE_URL: &str = "https://www.hmall.com/md/dpl/index?mainDispSeq=2&brodType=all";
const DEFAULT_CATALOG_PATH: &str = "data.json";

/// The env vars read at startup. Everything has a default.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapingEnv {
    schedule_url: Option<String>,
    catalog_path: Option<PathBuf>,
    #[serde(default)]
    reconcile_mode: ReconcileMode,
    headless: Option<bool>,
    navigation_timeout_secs: Option<u64>,
    page_settle_ms: Option<u64>,
    tab_settle_ms: Option<u64>,
    filter_settle_ms: Option<u64>,
    scroll_settle_ms: Option<u64>,
    scroll_step_px: Option<i64>,
    tab_window: Option<usize>,
    stagnation_limit: Option<usize>,
    max_passes: Option<usize>,
    filter_label: Option<String>,
}

/// Tuning for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub navigation_timeout: Duration,
    /// Wait after the initial load before looking for tabs.
    pub page_settle: Duration,
    pub tab_settle: Duration,
    pub filter_settle: Duration,
    pub scroll_settle: Duration,
    pub scroll_step_px: i64,
    /// How many tabs from today onwards are crawled.
    pub tab_window: usize,
    pub stagnation_limit: usize,
    pub max_passes: usize,
    /// Secondary category filter clicked after each tab, if present.
    pub filter_label: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(120),
            page_settle: Duration::from_secs(10),
            tab_settle: Duration::from_secs(4),
            filter_settle: Duration::from_secs(5),
            scroll_settle: Duration::from_millis(1500),
            scroll_step_px: 1000,
            tab_window: 7,
            stagnation_limit: 10,
            max_passes: 50,
            filter_label: Some("TV쇼핑".to_string()),
        }
    }
}

pub struct ScrapingConfig {
    pub schedule_url: String,
    pub catalog_path: PathBuf,
    pub reconcile_mode: ReconcileMode,
    pub headless: bool,
    pub crawl: CrawlConfig,
}

impl ScrapingConfig {
    pub fn new() -> anyhow::Result<Self> {
        let scraping_env = ScrapingEnv::load_from_env()?;
        Ok(Self::from_env(scraping_env))
    }

    pub fn from_env(env: ScrapingEnv) -> Self {
        let defaults = CrawlConfig::default();
        let millis = |value: Option<u64>, default: Duration| {
            value.map(Duration::from_millis).unwrap_or(default)
        };
        let crawl = CrawlConfig {
            navigation_timeout: env
                .navigation_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.navigation_timeout),
            page_settle: millis(env.page_settle_ms, defaults.page_settle),
            tab_settle: millis(env.tab_settle_ms, defaults.tab_settle),
            filter_settle: millis(env.filter_settle_ms, defaults.filter_settle),
            scroll_settle: millis(env.scroll_settle_ms, defaults.scroll_settle),
            scroll_step_px: env.scroll_step_px.unwrap_or(defaults.scroll_step_px),
            tab_window: env.tab_window.unwrap_or(defaults.tab_window),
            stagnation_limit: env.stagnation_limit.unwrap_or(defaults.stagnation_limit),
            max_passes: env.max_passes.unwrap_or(defaults.max_passes),
            // An empty FILTER_LABEL turns the filter click off.
            filter_label: match env.filter_label {
                Some(label) if label.trim().is_empty() => None,
                Some(label) => Some(label),
                None => defaults.filter_label,
            },
        };
        Self {
            schedule_url: env
                .schedule_url
                .unwrap_or_else(|| DEFAULT_SCHEDULE_URL.to_string()),
            catalog_path: env
                .catalog_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
            reconcile_mode: env.reconcile_mode,
            headless: env.headless.unwrap_or(true),
            crawl,
        }
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
