use std::sync::LazyLock;

use regex::Regex;

static DISCOUNT_BADGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+%.*").expect("discount badge pattern is valid"));

/// Everything before the first newline.
pub fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default()
}

/// Normalizes an `H:M` style time token to zero-padded `HH:MM`.
///
/// Only the first two `:` separated parts are read, so seconds are dropped.
/// Returns `None` when either part is missing or not a one or two digit number.
pub fn normalize_time(raw: &str) -> Option<String> {
    let mut parts = raw.trim().split(':');
    let (hours, minutes) = (parts.next()?, parts.next()?);
    let is_part = |part: &str| (1..=2).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit());
    if !is_part(hours) || !is_part(minutes) {
        return None;
    }
    Some(format!("{hours:0>2}:{minutes:0>2}"))
}

/// Cleans a product link's visible text into a display name.
///
/// Only the first line is kept, a discount badge (`30%할인 ...`) and
/// whatever follows it is cut, and the rest is trimmed. Names shorter than
/// two characters are noise and yield `None`.
pub fn clean_name(raw: &str) -> Option<String> {
    let line = first_line(raw.trim_start());
    let without_badge = match DISCOUNT_BADGE.find(line) {
        Some(badge) => &line[..badge.start()],
        None => line,
    };
    let name = without_badge.trim();
    (name.chars().count() >= 2).then(|| name.to_string())
}
