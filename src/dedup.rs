use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    carry_forward::Candidate,
    date_normalizer::DateNormalizer,
    schedule_item::{ItemKey, ScheduleItem},
    text_manipulators::clean_name,
};

/// Everything collected for one tab, keyed by `(date, time, code)`.
///
/// Rescans of an overlapping scroll window overwrite earlier sightings, so
/// the most recent rendering of a name wins.
#[derive(Debug, Default)]
pub struct TabResults {
    items: BTreeMap<ItemKey, ScheduleItem>,
}

impl TabResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cleans and inserts one item. Returns `false` when the name was noise.
    pub fn insert(&mut self, date: String, time: String, code: String, raw_name: &str) -> bool {
        let Some(name) = clean_name(raw_name) else {
            return false;
        };
        let item = ScheduleItem {
            date,
            time,
            code,
            name,
        };
        self.items.insert(item.key(), item);
        true
    }

    /// Normalizes each candidate's date and folds it in. Returns how many
    /// candidates survived name cleanup.
    pub fn fold(
        &mut self,
        candidates: Vec<Candidate>,
        normalizer: &DateNormalizer,
        today: NaiveDate,
        tab_label: &str,
    ) -> usize {
        candidates
            .into_iter()
            .filter(|candidate| {
                let date = normalizer
                    .normalize(&candidate.date_token, today, tab_label)
                    .to_string();
                self.insert(
                    date,
                    candidate.time.clone(),
                    candidate.code.clone(),
                    &candidate.raw_name,
                )
            })
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<ScheduleItem> {
        self.items.into_values().collect()
    }
}
