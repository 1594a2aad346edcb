use crate::model::PageTimeInfo;
use chrono_tz::Tz;
use regex::Regex;
use std::sync::LazyLock;

static RE_PAGE_CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,2}:\d{2}:\d{2}\s{0,3}[ap]m\b").expect("invalid regex: page clock")
});

static RE_TIMEZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:[A-Z][A-Za-z_]+(?:/[A-Z][A-Za-z0-9_+\-]+){1,2}|(?:UTC|GMT)(?:\s?[+-]\d{1,2}(?::\d{2})?)?)\b",
    )
    .expect("invalid regex: timezone")
});

pub fn extract_time_info(text: &str) -> PageTimeInfo {
    let current_time = RE_PAGE_CLOCK
        .find(text)
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "));

    let timezone = RE_TIMEZONE
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| is_timezone_label(candidate))
        .map(ToString::to_string);

    PageTimeInfo {
        current_time,
        timezone,
    }
}

// Region/City candidates must be real IANA names; anything slash-separated
// like "Km/H" would otherwise qualify.
fn is_timezone_label(candidate: &str) -> bool {
    if candidate.starts_with("UTC") || candidate.starts_with("GMT") {
        return true;
    }
    candidate.parse::<Tz>().is_ok()
}
