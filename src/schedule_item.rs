use serde::{Deserialize, Serialize};

/// One broadcast slot of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// `YYYY-MM-DD`, or the tab label when the date could not be resolved.
    pub date: String,
    /// Zero padded 24h `HH:MM`.
    pub time: String,
    pub code: String,
    pub name: String,
}

pub type ItemKey = (String, String, String);

impl ScheduleItem {
    pub fn key(&self) -> ItemKey {
        (self.date.clone(), self.time.clone(), self.code.clone())
    }
}
