pub mod browser;
pub mod catalog;
pub mod chromium;
pub mod config;
pub mod events;
pub mod schedule_item;
pub mod schedule_scraper;
pub mod scraping_context;
pub mod scroll_controller;

mod carry_forward;
mod date_normalizer;
mod dedup;
mod fragment;
mod text_manipulators;

#[cfg(test)]
mod testing;

pub use browser::{Browser, BrowserError};
pub use carry_forward::{Candidate, ExtractionState, resolve};
pub use catalog::{CatalogError, ReconcileMode, ReconcileReport, update_catalog};
pub use chromium::ChromiumBrowser;
pub use config::{CrawlConfig, ScrapingConfig};
pub use date_normalizer::{DateNormalizer, NormalizedDate};
pub use dedup::TabResults;
pub use events::{CrawlEvent, EventSink};
pub use fragment::{FragmentExtractor, RawContainer, RawFragment, RawLink};
pub use schedule_item::ScheduleItem;
pub use schedule_scraper::crawl;
pub use scraping_context::ScrapingContext;
