use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One schedule container as reported by the page script.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContainer {
    #[serde(default)]
    pub data_time: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub links: Vec<RawLink>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawLink {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// A container reduced to the markers it carries and the products it lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFragment {
    pub marker_time: Option<String>,
    pub marker_date: Option<String>,
    /// `(product code, raw link text)` in document order.
    pub links: Vec<(String, String)>,
}

/// Coerces the page script's result into containers.
///
/// Entries that don't fit the schema are dropped one by one, so a single odd
/// node never costs the whole pass.
pub fn parse_containers(payload: Value) -> Vec<RawContainer> {
    let Value::Object(mut payload) = payload else {
        debug!("Container payload was not an object, ignoring it");
        return vec![];
    };
    let Some(Value::Array(entries)) = payload.remove("containers") else {
        debug!("Container payload had no containers array");
        return vec![];
    };
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<RawContainer>(entry) {
            Ok(container) => Some(container),
            Err(e) => {
                debug!("Skipping malformed container: {e}");
                None
            }
        })
        .collect()
}

pub struct FragmentExtractor {
    time_regex: Regex,
    // Absolute `3월 5일` style date marker.
    month_day_regex: Regex,
    code_in_href_regex: Regex,
}

impl FragmentExtractor {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            time_regex: Regex::new(r"([0-9]{1,2}:[0-9]{2})")?,
            month_day_regex: Regex::new(r"([0-9]{1,2}월\s*[0-9]{1,2}일)")?,
            code_in_href_regex: Regex::new(r"slitmCd=([0-9]+)")?,
        })
    }

    pub fn extract(&self, container: &RawContainer) -> RawFragment {
        RawFragment {
            marker_time: self.marker_time(container),
            marker_date: self.marker_date(&container.text),
            links: container
                .links
                .iter()
                .filter_map(|link| Some((self.product_code(link)?, link.text.clone())))
                .collect(),
        }
    }

    pub fn extract_all(&self, containers: &[RawContainer]) -> Vec<RawFragment> {
        containers.iter().map(|c| self.extract(c)).collect()
    }

    fn marker_time(&self, container: &RawContainer) -> Option<String> {
        // `data-time` is usually `YYYY-MM-DD HH:MM`.
        let from_attribute = container
            .data_time
            .as_deref()
            .map(|raw| {
                if raw.contains(' ') {
                    raw.split(' ').nth(1).unwrap_or_default()
                } else {
                    raw
                }
            })
            .filter(|time| !time.is_empty());
        match from_attribute {
            Some(time) => Some(time.to_string()),
            None => self
                .time_regex
                .captures(&container.text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
        }
    }

    fn marker_date(&self, text: &str) -> Option<String> {
        if let Some(m) = self.month_day_regex.find(text) {
            return Some(m.as_str().to_string());
        }
        ["내일", "오늘", "어제"]
            .into_iter()
            .find(|token| text.contains(token))
            .map(str::to_string)
    }

    fn product_code(&self, link: &RawLink) -> Option<String> {
        if let Some(code) = link.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            return Some(code.to_string());
        }
        let href = link.href.as_deref()?;
        let caps = self.code_in_href_regex.captures(href)?;
        Some(caps.get(1)?.as_str().to_string())
    }
}
