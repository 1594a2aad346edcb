use crate::catalog::{Catalog, CatalogEntry};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

pub const MAX_ASCENT: usize = 4;

const MAX_HEADING_CHARS: usize = 96;

static ANY_ELEMENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("*").expect("universal selector must parse"));

const CONDITION_KEYWORDS: [&str; 5] = [
    "current",
    "next condition",
    "major condition",
    "no active",
    "not available",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStrategy {
    Regex,
    DomWalk,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPreference {
    #[default]
    Auto,
    Regex,
    DomWalk,
}

#[derive(Clone, Copy)]
pub enum PageInput<'a> {
    Text(&'a str),
    Document(&'a Html),
}

impl<'a> PageInput<'a> {
    pub fn strategy(&self) -> SectionStrategy {
        match self {
            PageInput::Text(_) => SectionStrategy::Regex,
            PageInput::Document(_) => SectionStrategy::DomWalk,
        }
    }

    pub fn flattened_text(&self) -> Cow<'a, str> {
        match self {
            PageInput::Text(text) => Cow::Borrowed(*text),
            PageInput::Document(doc) => Cow::Owned(flatten(doc.root_element())),
        }
    }
}

pub fn split_sections(input: &PageInput<'_>, catalog: &Catalog) -> Vec<String> {
    match input {
        PageInput::Text(text) => catalog
            .entries()
            .iter()
            .map(|entry| bounded_section(text, entry).unwrap_or_default().to_string())
            .collect(),
        PageInput::Document(doc) => catalog
            .entries()
            .iter()
            .map(|entry| dom_section(doc, catalog, entry).unwrap_or_default())
            .collect(),
    }
}

fn bounded_section<'t>(text: &'t str, entry: &CatalogEntry) -> Option<&'t str> {
    let own = entry.name_pattern.find(text)?;
    let end = entry
        .boundary
        .find_at(text, own.end())
        .map(|m| m.start())
        .unwrap_or(text.len());
    Some(text[own.start()..end].trim())
}

fn dom_section(doc: &Html, catalog: &Catalog, entry: &CatalogEntry) -> Option<String> {
    let mut fallback = None;
    for heading in heading_candidates(doc, entry) {
        let (container, has_info) = climb(heading, catalog, entry);
        if has_info {
            return Some(container_section(container, entry));
        }
        fallback.get_or_insert(container);
    }

    match fallback {
        Some(container) => Some(container_section(container, entry)),
        None => {
            debug!(zone = %entry.name, "no heading node for zone");
            None
        }
    }
}

// Ascends until the container shows condition text, another zone appears, or
// MAX_ASCENT is reached. The flag reports whether condition text was found.
fn climb<'d>(
    heading: ElementRef<'d>,
    catalog: &Catalog,
    entry: &CatalogEntry,
) -> (ElementRef<'d>, bool) {
    if has_condition_info(&flatten(heading)) {
        return (heading, true);
    }

    let mut container = heading;
    for _ in 0..MAX_ASCENT {
        let Some(parent) = container.parent().and_then(ElementRef::wrap) else {
            break;
        };
        let text = flatten(parent);
        if catalog.mentions_other_zone(&text, &entry.name) {
            break;
        }
        container = parent;
        if has_condition_info(&text) {
            return (container, true);
        }
    }
    (container, false)
}

fn container_section(container: ElementRef<'_>, entry: &CatalogEntry) -> String {
    let text = flatten(container);
    match bounded_section(&text, entry) {
        Some(section) => section.to_string(),
        None => text,
    }
}

// Deepest heading-like or short elements naming the zone, in document order.
fn heading_candidates<'d>(doc: &'d Html, entry: &CatalogEntry) -> Vec<ElementRef<'d>> {
    let names_zone = |el: ElementRef<'_>| {
        (is_heading_like(el) || text_within(el, MAX_HEADING_CHARS))
            && entry.name_pattern.is_match(&flatten(el))
    };
    doc.select(&ANY_ELEMENT)
        .filter(|el| names_zone(*el) && !el.child_elements().any(names_zone))
        .collect()
}

fn is_heading_like(el: ElementRef<'_>) -> bool {
    let value = el.value();
    matches!(value.name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
        || value.attr("role") == Some("heading")
        || value.classes().any(|class| {
            let class = class.to_ascii_lowercase();
            class.contains("title") || class.contains("heading")
        })
}

// Stops counting once the limit is passed, so page-wide containers cost little.
fn text_within(el: ElementRef<'_>, limit: usize) -> bool {
    let mut len = 0;
    for chunk in el.text() {
        len += chunk.trim().len();
        if len > limit {
            return false;
        }
    }
    true
}

fn has_condition_info(text: &str) -> bool {
    let lower = text.to_lowercase();
    CONDITION_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn flatten(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
