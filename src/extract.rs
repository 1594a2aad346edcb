use crate::catalog::Catalog;
use crate::clock::extract_time_info;
use crate::fields::parse_section;
use crate::model::{ScrapeResult, ZoneCondition};
use crate::section::{PageInput, split_sections};
use chrono::{DateTime, Utc};
use tracing::debug;

pub fn extract(input: &PageInput<'_>, catalog: &Catalog) -> ScrapeResult {
    extract_at(input, catalog, Utc::now())
}

/// Same as [`extract`] with a caller-supplied capture instant. Identical
/// inputs always produce identical results.
pub fn extract_at(
    input: &PageInput<'_>,
    catalog: &Catalog,
    captured_at: DateTime<Utc>,
) -> ScrapeResult {
    let page_text = input.flattened_text();
    let time_info = extract_time_info(&page_text);

    ScrapeResult {
        timestamp: captured_at,
        time_info,
        zones: extract_zones(input, catalog),
    }
}

pub fn extract_zones(input: &PageInput<'_>, catalog: &Catalog) -> Vec<ZoneCondition> {
    let sections = split_sections(input, catalog);
    catalog
        .names()
        .zip(sections)
        .map(|(name, section)| {
            let zone = parse_section(name, &section);
            debug!(
                zone = %name,
                strategy = ?input.strategy(),
                section_len = section.len(),
                status = zone.status.as_str(),
                current = ?zone.current_condition,
                major = zone.is_major,
                "zone parsed"
            );
            zone
        })
        .collect()
}
