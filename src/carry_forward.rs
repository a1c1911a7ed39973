use serde::{Deserialize, Serialize};

use crate::{fragment::RawFragment, text_manipulators::normalize_time};

pub const INITIAL_DATE_TOKEN: &str = "오늘";
pub const INITIAL_TIME: &str = "00:00";

/// The date and time markers most recently seen while walking a tab's list.
///
/// A fresh state is created per tab and handed from one pass to the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionState {
    pub last_date: String,
    pub last_time: String,
}

impl Default for ExtractionState {
    fn default() -> Self {
        Self {
            last_date: INITIAL_DATE_TOKEN.to_string(),
            last_time: INITIAL_TIME.to_string(),
        }
    }
}

/// A product sighting tagged with the markers in effect where it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub code: String,
    pub raw_name: String,
    pub time: String,
    pub date_token: String,
}

/// Walks one pass worth of fragments in document order, carrying the last
/// seen markers forward onto the links that follow them.
///
/// A fragment's own markers apply to its own links. A time marker that does
/// not normalize is ignored.
pub fn resolve(
    fragments: &[RawFragment],
    mut state: ExtractionState,
) -> (Vec<Candidate>, ExtractionState) {
    let mut candidates = vec![];
    for fragment in fragments {
        if let Some(time) = fragment.marker_time.as_deref().and_then(normalize_time) {
            state.last_time = time;
        }
        if let Some(date) = &fragment.marker_date {
            state.last_date = date.clone();
        }
        candidates.extend(fragment.links.iter().map(|(code, raw_name)| Candidate {
            code: code.clone(),
            raw_name: raw_name.clone(),
            time: state.last_time.clone(),
            date_token: state.last_date.clone(),
        }));
    }
    (candidates, state)
}
