use chrono::{DateTime, Local, TimeZone, Utc};

const LABEL_FMT: &str = "%b %-d, %Y • %-I:%M %p";

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// `Mar 4, 2024 • 3:07 PM` in the given zone; out-of-range input yields `"-"`.
pub fn timestamp_label_in<Tz: TimeZone>(ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.with_timezone(tz).format(LABEL_FMT).to_string(),
        None => "-".to_string(),
    }
}

pub fn timestamp_label(ms: i64) -> String {
    timestamp_label_in(ms, &Local)
}
