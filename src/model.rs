use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStatus {
    #[default]
    Available,
    NoActiveCondition,
    NotAvailable,
}

impl ZoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneStatus::Available => "available",
            ZoneStatus::NoActiveCondition => "no_active_condition",
            ZoneStatus::NotAvailable => "not_available",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZoneCondition {
    pub name: String,
    pub current_condition: Option<String>,
    pub is_major: bool,
    pub next_condition: Option<String>,
    pub next_time: Option<String>,
    pub status: ZoneStatus,
}

impl ZoneCondition {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            current_condition: None,
            is_major: false,
            next_condition: None,
            next_time: None,
            status: ZoneStatus::Available,
        }
    }

    pub fn with_status(name: &str, status: ZoneStatus) -> Self {
        Self {
            status,
            ..Self::empty(name)
        }
    }

    pub fn is_active(&self) -> bool {
        self.current_condition.is_some()
    }

    pub fn has_upcoming(&self) -> bool {
        self.next_condition.is_some()
    }

    pub fn next_time_of_day(&self) -> Option<NaiveTime> {
        self.next_time.as_deref().and_then(parse_clock_time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PageTimeInfo {
    pub current_time: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapeResult {
    pub timestamp: DateTime<Utc>,
    pub time_info: PageTimeInfo,
    pub zones: Vec<ZoneCondition>,
}

impl ScrapeResult {
    pub fn total_zones(&self) -> usize {
        self.zones.len()
    }

    pub fn active_count(&self) -> usize {
        self.zones.iter().filter(|z| z.is_active()).count()
    }

    pub fn major_count(&self) -> usize {
        self.zones.iter().filter(|z| z.is_major).count()
    }

    pub fn zone(&self, name: &str) -> Option<&ZoneCondition> {
        self.zones.iter().find(|z| z.name == name)
    }
}

/// Parses `H:MM AM`, `HH:MM PM` or `H:MMPM` (any case) into a time of day.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let compact = value
        .split_whitespace()
        .collect::<String>()
        .to_ascii_uppercase();
    NaiveTime::parse_from_str(&compact, "%I:%M%p").ok()
}
