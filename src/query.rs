use crate::catalog::Catalog;
use crate::fetch::FetchError;
use crate::format::{
    active_zones, filter_label, render_active, render_active_summary, render_summary,
    render_text, render_upcoming, render_upcoming_summary, render_zone, upcoming_zones,
};
use crate::model::ScrapeResult;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
    Summary,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
            OutputFormat::Summary => "summary",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            "summary" => Ok(OutputFormat::Summary),
            _ => Err(QueryError::InvalidFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionsQuery {
    All,
    Zone(String),
    Active { major_only: bool },
    Upcoming,
}

impl ConditionsQuery {
    pub fn label(&self) -> &'static str {
        match self {
            ConditionsQuery::All => "all zones",
            ConditionsQuery::Zone(_) => "single zone",
            ConditionsQuery::Active { .. } => "active zones",
            ConditionsQuery::Upcoming => "upcoming conditions",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Map '{0}' not found")]
    UnknownZone(String),
    #[error("unsupported format '{0}'; expected json, text or summary")]
    InvalidFormat(String),
    #[error("format '{format}' is not supported for {query} queries")]
    UnsupportedFormat {
        format: OutputFormat,
        query: &'static str,
    },
    #[error("failed to fetch map conditions: {0}")]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Json(Value),
    Text(String),
}

impl QueryOutput {
    pub fn to_display_string(&self) -> String {
        match self {
            QueryOutput::Text(text) => text.clone(),
            QueryOutput::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            QueryOutput::Json(value) => value,
            QueryOutput::Text(text) => Value::String(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    query: ConditionsQuery,
    format: OutputFormat,
}

pub fn resolve(
    query: &ConditionsQuery,
    format: OutputFormat,
    catalog: &Catalog,
) -> Result<ResolvedQuery, QueryError> {
    let query = match query {
        ConditionsQuery::Zone(name) => {
            let canonical = catalog
                .resolve(name)
                .ok_or_else(|| QueryError::UnknownZone(name.clone()))?;
            if format == OutputFormat::Summary {
                return Err(QueryError::UnsupportedFormat {
                    format,
                    query: query.label(),
                });
            }
            ConditionsQuery::Zone(canonical.to_string())
        }
        other => other.clone(),
    };
    Ok(ResolvedQuery { query, format })
}

pub fn render(resolved: &ResolvedQuery, result: &ScrapeResult) -> Result<QueryOutput, QueryError> {
    let format = resolved.format;
    let output = match &resolved.query {
        ConditionsQuery::All => match format {
            OutputFormat::Json => QueryOutput::Json(to_json(result)),
            OutputFormat::Text => QueryOutput::Text(render_text(result)),
            OutputFormat::Summary => QueryOutput::Text(render_summary(result)),
        },
        ConditionsQuery::Zone(name) => {
            let zone = result
                .zone(name)
                .ok_or_else(|| QueryError::UnknownZone(name.clone()))?;
            match format {
                OutputFormat::Json => QueryOutput::Json(to_json(zone)),
                _ => QueryOutput::Text(render_zone(zone)),
            }
        }
        ConditionsQuery::Active { major_only } => {
            let zones = active_zones(result, *major_only);
            match format {
                OutputFormat::Json => QueryOutput::Json(json!({
                    "active_zones": zones,
                    "total_active": zones.len(),
                    "filter": if *major_only { "major_only" } else { "all_active" },
                    "description": filter_label(*major_only),
                })),
                OutputFormat::Text => QueryOutput::Text(render_active(&zones, *major_only)),
                OutputFormat::Summary => {
                    QueryOutput::Text(render_active_summary(&zones, *major_only))
                }
            }
        }
        ConditionsQuery::Upcoming => {
            let zones = upcoming_zones(result);
            match format {
                OutputFormat::Json => QueryOutput::Json(json!({
                    "upcoming_conditions": zones,
                    "total_upcoming": zones.len(),
                })),
                OutputFormat::Text => QueryOutput::Text(render_upcoming(&zones)),
                OutputFormat::Summary => QueryOutput::Text(render_upcoming_summary(&zones)),
            }
        }
    };
    Ok(output)
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
