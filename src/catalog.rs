use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

pub const DEFAULT_ZONES: [&str; 6] = [
    "Dam Battlegrounds",
    "Buried City",
    "The Spaceport",
    "The Blue Gate",
    "Practice Range",
    "Stella Montis",
];

pub const FOOTER_MARKER: &str = "Data based on UTC";

static DEFAULT_CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::new(DEFAULT_ZONES).expect("default zone catalog must compile")
});

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("zone catalog must not be empty")]
    Empty,
    #[error("zone name must not be blank")]
    BlankName,
    #[error("duplicate zone name {0}")]
    Duplicate(String),
    #[error("failed to compile pattern for zone {name}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub slug: String,
    pub(crate) name_pattern: Regex,
    pub(crate) boundary: Regex,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new<I, S>(names: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| normalize_name(n.as_ref()))
            .collect();

        if names.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (idx, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(CatalogError::BlankName);
            }
            if names[..idx].iter().any(|n| n.eq_ignore_ascii_case(name)) {
                return Err(CatalogError::Duplicate(name.clone()));
            }
        }

        let mut entries = Vec::with_capacity(names.len());
        for name in &names {
            let name_pattern = compile_ci(&flexible_literal(name), name)?;

            let mut stops: Vec<String> = names
                .iter()
                .filter(|other| *other != name)
                .map(|other| flexible_literal(other))
                .collect();
            stops.push(flexible_literal(FOOTER_MARKER));
            let boundary = compile_ci(&format!("(?:{})", stops.join("|")), name)?;

            entries.push(CatalogEntry {
                name: name.clone(),
                slug: slugify(name),
                name_pattern,
                boundary,
            });
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn resolve(&self, query: &str) -> Option<&str> {
        let wanted = query.trim();
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(wanted) || e.slug.eq_ignore_ascii_case(wanted))
            .map(|e| e.name.as_str())
    }

    pub(crate) fn mentions_other_zone(&self, text: &str, own: &str) -> bool {
        self.entries
            .iter()
            .filter(|e| e.name != own)
            .any(|e| e.name_pattern.is_match(text))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}

pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Spaces in a name match any whitespace run in rendered text.
fn flexible_literal(value: &str) -> String {
    value
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

fn compile_ci(pattern: &str, name: &str) -> Result<Regex, CatalogError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| CatalogError::Pattern {
            name: name.to_string(),
            source,
        })
}
