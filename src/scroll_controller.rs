use chrono::NaiveDate;
use log::{debug, warn};
use tokio::time::sleep;

use crate::{
    browser::{Browser, BrowserError, CONTAINERS_SCRIPT},
    carry_forward::{ExtractionState, resolve},
    config::CrawlConfig,
    dedup::TabResults,
    events::{CrawlEvent, EventSink},
    fragment::parse_containers,
    scraping_context::ScrapingContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    Scrolling,
    /// Consecutive passes that did not grow the page.
    Stagnant(usize),
    Done,
}

impl ScrollState {
    pub fn stagnant_passes(self) -> usize {
        match self {
            ScrollState::Stagnant(passes) => passes,
            _ => 0,
        }
    }

    /// `grew` is `None` when the page height could not be measured, which
    /// leaves the counter where it was.
    pub fn advance(self, grew: Option<bool>, stagnation_limit: usize) -> Self {
        match (self, grew) {
            (ScrollState::Done, _) => ScrollState::Done,
            (state, None) => state,
            (_, Some(true)) => ScrollState::Scrolling,
            (state, Some(false)) => {
                let stagnant = state.stagnant_passes() + 1;
                if stagnant >= stagnation_limit {
                    ScrollState::Done
                } else {
                    ScrollState::Stagnant(stagnant)
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum PassOutcome {
    /// How many candidates made it into the tab's results.
    Extracted { kept: usize },
    ExtractionFailed(BrowserError),
}

/// Reads the rendered containers once and folds them into `results`.
///
/// On failure the extraction state comes back unchanged.
pub async fn run_pass<B: Browser>(
    browser: &mut B,
    context: &ScrapingContext,
    state: ExtractionState,
    results: &mut TabResults,
    today: NaiveDate,
    tab_label: &str,
) -> (PassOutcome, ExtractionState) {
    let payload = match browser.evaluate(CONTAINERS_SCRIPT).await {
        Ok(payload) => payload,
        Err(e) => return (PassOutcome::ExtractionFailed(e), state),
    };
    let containers = parse_containers(payload);
    let fragments = context.fragment_extractor.extract_all(&containers);
    let (candidates, state) = resolve(&fragments, state);
    let kept = results.fold(candidates, &context.date_normalizer, today, tab_label);
    (PassOutcome::Extracted { kept }, state)
}

/// Scrolls one step and reports whether the page got taller.
async fn scroll_and_measure<B: Browser>(browser: &mut B, config: &CrawlConfig) -> Option<bool> {
    let before = browser.content_height().await;
    if let Err(e) = browser.scroll_by(config.scroll_step_px).await {
        warn!("Scroll command failed: {e}");
    }
    sleep(config.scroll_settle).await;
    let after = browser.content_height().await;
    match (before, after) {
        (Ok(before), Ok(after)) => Some(after != before),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Could not read page height: {e}");
            None
        }
    }
}

/// Keeps extracting and scrolling the active tab until the page stops
/// growing for `stagnation_limit` passes in a row, or `max_passes` is hit.
pub async fn scroll_tab<B: Browser>(
    browser: &mut B,
    context: &ScrapingContext,
    index: usize,
    tab_label: &str,
    today: NaiveDate,
    sink: &EventSink,
) -> TabResults {
    let config = &context.crawl_config;
    let mut results = TabResults::new();
    let mut extraction = ExtractionState::default();
    let mut state = ScrollState::Scrolling;
    let mut pass = 0;

    while state != ScrollState::Done && pass < config.max_passes {
        pass += 1;
        let (outcome, next) =
            run_pass(browser, context, extraction, &mut results, today, tab_label).await;
        extraction = next;
        let kept = match outcome {
            PassOutcome::Extracted { kept } => kept,
            PassOutcome::ExtractionFailed(e) => {
                warn!("Pass {pass} on {tab_label:?} failed, skipping it: {e}");
                0
            }
        };

        let grew = scroll_and_measure(browser, config).await;
        state = state.advance(grew, config.stagnation_limit);
        debug!(
            "Pass {pass} on {tab_label:?}: {kept} candidates, {} total, {state:?}",
            results.len()
        );
        sink.emit(CrawlEvent::PassCompleted {
            index,
            pass,
            candidates: kept,
            stagnant: state.stagnant_passes(),
        });
    }

    if state != ScrollState::Done {
        debug!("Stopped {tab_label:?} at the {} pass ceiling", config.max_passes);
    }
    if results.is_empty() {
        warn!("No broadcasts found on {tab_label:?}");
    }
    results
}
