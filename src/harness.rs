use crate::catalog::Catalog;
use crate::extract::extract_at;
use crate::model::ZoneCondition;
use crate::section::PageInput;
use chrono::Utc;
use scraper::Html;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ZoneParity {
    pub zone: String,
    pub agrees: bool,
    pub regex: ZoneCondition,
    pub dom_walk: ZoneCondition,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub zones: usize,
    pub agreeing: usize,
    pub regex_idempotent: bool,
    pub dom_walk_idempotent: bool,
    pub time_info_agrees: bool,
    pub details: Vec<ZoneParity>,
}

impl HarnessReport {
    pub fn is_clean(&self) -> bool {
        self.agreeing == self.zones
            && self.regex_idempotent
            && self.dom_walk_idempotent
            && self.time_info_agrees
    }
}

pub fn run_harness(html: &str, catalog: &Catalog) -> HarnessReport {
    let doc = Html::parse_document(html);
    let dom_input = PageInput::Document(&doc);
    let text = dom_input.flattened_text().into_owned();
    let text_input = PageInput::Text(&text);
    let now = Utc::now();

    let regex_first = extract_at(&text_input, catalog, now);
    let regex_second = extract_at(&text_input, catalog, now);
    let dom_first = extract_at(&dom_input, catalog, now);
    let dom_second = extract_at(&dom_input, catalog, now);

    let details: Vec<ZoneParity> = regex_first
        .zones
        .iter()
        .zip(&dom_first.zones)
        .map(|(regex, dom_walk)| ZoneParity {
            zone: regex.name.clone(),
            agrees: regex == dom_walk,
            regex: regex.clone(),
            dom_walk: dom_walk.clone(),
        })
        .collect();

    HarnessReport {
        zones: details.len(),
        agreeing: details.iter().filter(|d| d.agrees).count(),
        regex_idempotent: regex_first == regex_second,
        dom_walk_idempotent: dom_first == dom_second,
        time_info_agrees: regex_first.time_info == dom_first.time_info,
        details,
    }
}
