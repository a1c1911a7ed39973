use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use log::warn;
use regex::Regex;

use crate::text_manipulators::first_line;

// A month/day more than this many months away from today belongs to the
// neighbouring year.
const ROLLOVER_MONTHS: i32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDate {
    Calendar(NaiveDate),
    /// The tab's own label, used when no marker could be understood.
    Literal(String),
}

impl fmt::Display for NormalizedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedDate::Calendar(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            NormalizedDate::Literal(label) => f.write_str(label),
        }
    }
}

pub struct DateNormalizer {
    month_day_regex: Regex,
}

impl DateNormalizer {
    pub fn new() -> anyhow::Result<Self> {
        let month_day_regex = Regex::new(r"([0-9]{1,2})월\s*([0-9]{1,2})일")?;
        Ok(Self { month_day_regex })
    }

    pub fn normalize(&self, token: &str, today: NaiveDate, tab_label: &str) -> NormalizedDate {
        let resolved = match token.trim() {
            "오늘" => Some(today),
            "내일" => today.checked_add_days(Days::new(1)),
            "어제" => today.checked_sub_days(Days::new(1)),
            other => self.month_day(other, today),
        };
        match resolved {
            Some(date) => NormalizedDate::Calendar(date),
            None => {
                let literal = first_line(tab_label).trim().to_string();
                warn!("Unrecognised date marker {token:?}, falling back to tab label {literal:?}");
                NormalizedDate::Literal(literal)
            }
        }
    }

    fn month_day(&self, token: &str, today: NaiveDate) -> Option<NaiveDate> {
        let caps = self.month_day_regex.captures(token)?;
        let month = caps.get(1)?.as_str().parse::<u32>().ok()?;
        let day = caps.get(2)?.as_str().parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(infer_year(today, month), month, day)
    }
}

/// Picks the year for a bare month so that December listings showing
/// January land in the next year and vice versa.
fn infer_year(today: NaiveDate, month: u32) -> i32 {
    let distance = month as i32 - today.month() as i32;
    if distance > ROLLOVER_MONTHS {
        today.year() - 1
    } else if distance < -ROLLOVER_MONTHS {
        today.year() + 1
    } else {
        today.year()
    }
}
