use crate::model::{ZoneCondition, ZoneStatus};
use crate::section::normalize_whitespace;
use regex::Regex;
use std::sync::LazyLock;

static RE_NO_ACTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)no\s+active\s+condition").expect("invalid regex: no active condition")
});

static RE_NOT_AVAILABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)map\s+not\s+available").expect("invalid regex: map not available")
});

static RE_MAJOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)major\s+condition").expect("invalid regex: major condition")
});

// Flattened page text can glue a marker to the previous word, so markers have
// no leading word boundary. The label run is letters and spaces only and must
// reach a terminator; a label followed by a clock time does not match.
static RE_CURRENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)current\s+([a-z][a-z\s]*?)(?:\s+major\s+condition|\s+next\s+condition|\s*$)",
    )
    .expect("invalid regex: current condition")
});

// Label lookahead is capped at 64 characters before the clock token.
static RE_NEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)next\s+condition\s+([a-z](?:[a-z\s]{0,62}?[a-z])?)\s*(\d{1,2}:\d{2}\s*[ap]m)\b",
    )
    .expect("invalid regex: next condition")
});

pub fn parse_section(name: &str, section: &str) -> ZoneCondition {
    if RE_NO_ACTIVE.is_match(section) {
        return ZoneCondition::with_status(name, ZoneStatus::NoActiveCondition);
    }
    if RE_NOT_AVAILABLE.is_match(section) {
        return ZoneCondition::with_status(name, ZoneStatus::NotAvailable);
    }

    let mut zone = ZoneCondition::empty(name);
    zone.is_major = RE_MAJOR.is_match(section);

    zone.current_condition = RE_CURRENT
        .captures(section)
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_whitespace(m.as_str()))
        .filter(|v| !v.is_empty());

    if let Some(caps) = RE_NEXT.captures(section)
        && let (Some(label), Some(time)) = (caps.get(1), caps.get(2))
    {
        zone.next_condition = Some(normalize_whitespace(label.as_str()));
        zone.next_time = Some(time.as_str().to_string());
    }

    zone
}
