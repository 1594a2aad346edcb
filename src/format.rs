use crate::model::{ScrapeResult, ZoneCondition, ZoneStatus};

const RULE_WIDTH: usize = 50;

pub fn render_text(result: &ScrapeResult) -> String {
    let mut lines = vec!["MAP CONDITIONS".to_string(), "=".repeat(RULE_WIDTH)];

    if let Some(time) = &result.time_info.current_time {
        lines.push(format!("Current time: {time}"));
    }
    if let Some(tz) = &result.time_info.timezone {
        lines.push(format!("Timezone: {tz}"));
    }
    lines.push(format!("Zones: {}", result.total_zones()));
    lines.push(String::new());

    for zone in &result.zones {
        lines.push(render_zone(zone));
        lines.push(String::new());
    }

    lines.push(format!(
        "Last updated: {}",
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.join("\n")
}

pub fn render_zone(zone: &ZoneCondition) -> String {
    let mut lines = vec![zone.name.clone(), "-".repeat(zone.name.chars().count())];
    match zone.status {
        ZoneStatus::NotAvailable => lines.push("  Map not available yet".to_string()),
        ZoneStatus::NoActiveCondition => lines.push("  No active condition".to_string()),
        ZoneStatus::Available => lines.extend(condition_lines(zone)),
    }
    lines.join("\n")
}

pub fn render_summary(result: &ScrapeResult) -> String {
    let mut summary = format!(
        "{}/{} zones have active conditions",
        result.active_count(),
        result.total_zones()
    );
    let majors = result.major_count();
    if majors > 0 {
        summary.push_str(&format!(" ({majors} major conditions)"));
    }
    summary
}

pub fn render_active(zones: &[&ZoneCondition], major_only: bool) -> String {
    if zones.is_empty() {
        return no_active_message(major_only);
    }

    let title = if major_only {
        "MAJOR CONDITIONS"
    } else {
        "ACTIVE CONDITIONS"
    };
    let mut lines = vec![
        format!("{title} ({} zones)", zones.len()),
        "=".repeat(RULE_WIDTH),
    ];
    for zone in zones {
        lines.push(zone.name.clone());
        lines.extend(condition_lines(zone));
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn render_active_summary(zones: &[&ZoneCondition], major_only: bool) -> String {
    if zones.is_empty() {
        return no_active_message(major_only);
    }
    format!("{} zones have {}", zones.len(), filter_label(major_only))
}

pub fn render_upcoming(zones: &[&ZoneCondition]) -> String {
    if zones.is_empty() {
        return "No upcoming conditions scheduled".to_string();
    }

    let mut lines = vec![
        format!("UPCOMING CONDITIONS ({} zones)", zones.len()),
        "=".repeat(RULE_WIDTH),
    ];
    for zone in zones {
        if let Some(next) = next_line(zone) {
            lines.push(format!("{}: {next}", zone.name));
        }
    }
    lines.join("\n")
}

pub fn render_upcoming_summary(zones: &[&ZoneCondition]) -> String {
    match zones.first() {
        None => "No upcoming conditions scheduled".to_string(),
        Some(first) => format!(
            "{} zones have upcoming conditions; next up: {} at {}",
            zones.len(),
            first.name,
            first.next_time.as_deref().unwrap_or("unknown time")
        ),
    }
}

pub fn active_zones(result: &ScrapeResult, major_only: bool) -> Vec<&ZoneCondition> {
    result
        .zones
        .iter()
        .filter(|z| z.is_active() && (!major_only || z.is_major))
        .collect()
}

/// Zones with a scheduled next condition, earliest time of day first.
/// Unparseable times go last; ties keep catalog order.
pub fn upcoming_zones(result: &ScrapeResult) -> Vec<&ZoneCondition> {
    let mut zones: Vec<&ZoneCondition> = result.zones.iter().filter(|z| z.has_upcoming()).collect();
    zones.sort_by_key(|z| match z.next_time_of_day() {
        Some(time) => (0, Some(time)),
        None => (1, None),
    });
    zones
}

pub fn filter_label(major_only: bool) -> &'static str {
    if major_only {
        "major conditions"
    } else {
        "active conditions"
    }
}

fn no_active_message(major_only: bool) -> String {
    format!("No zones currently have {}", filter_label(major_only))
}

fn condition_lines(zone: &ZoneCondition) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(current) = &zone.current_condition {
        let marker = if zone.is_major { " [MAJOR]" } else { "" };
        lines.push(format!("  Current: {current}{marker}"));
    } else if zone.is_major {
        lines.push("  Major condition in effect".to_string());
    }
    if let Some(next) = next_line(zone) {
        lines.push(format!("  Next: {next}"));
    }
    lines
}

fn next_line(zone: &ZoneCondition) -> Option<String> {
    match (&zone.next_condition, &zone.next_time) {
        (Some(label), Some(time)) => Some(format!("{label} at {time}")),
        _ => None,
    }
}
