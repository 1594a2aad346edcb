use crate::catalog::Catalog;
use crate::config::{AppConfig, BodyKind};
use crate::extract::extract;
use crate::fetch::{FetchError, FetchedPage, Fetcher};
use crate::model::ScrapeResult;
use crate::query::{ConditionsQuery, OutputFormat, QueryError, QueryOutput, render, resolve};
use crate::section::{PageInput, StrategyPreference};
use crate::store::save_result;
use anyhow::{Context, Result};
use scraper::Html;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug)]
pub struct ConditionsService {
    fetcher: Fetcher,
    catalog: Catalog,
    strategy: StrategyPreference,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub result: ScrapeResult,
    pub saved_to: Option<PathBuf>,
    pub save_error: Option<String>,
}

impl ConditionsService {
    pub fn new(fetcher: Fetcher, catalog: Catalog) -> Self {
        Self {
            fetcher,
            catalog,
            strategy: StrategyPreference::Auto,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = Fetcher::from_config(&config.fetch).context("failed to build fetcher")?;
        Ok(Self::new(fetcher, Catalog::default()).with_strategy(config.extract.strategy))
    }

    pub fn with_strategy(mut self, strategy: StrategyPreference) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn scrape(&self) -> Result<ScrapeResult, FetchError> {
        let page = self.fetcher.fetch_page()?;
        let result = extract_page(&page, &self.catalog, self.strategy);
        info!(
            url = %page.source_url,
            zones = result.total_zones(),
            active = result.active_count(),
            major = result.major_count(),
            "scrape complete"
        );
        Ok(result)
    }

    /// Validates the request, then scrapes and renders it. Unknown zones and
    /// unsupported formats are rejected without fetching.
    pub fn answer(
        &self,
        query: &ConditionsQuery,
        format: OutputFormat,
    ) -> Result<QueryOutput, QueryError> {
        let resolved = resolve(query, format, &self.catalog)?;
        let result = self.scrape()?;
        render(&resolved, &result)
    }

    pub fn run(&self, save_path: Option<PathBuf>) -> Result<RunReport, FetchError> {
        let result = self.scrape()?;
        let mut report = RunReport {
            result,
            saved_to: None,
            save_error: None,
        };

        if let Some(path) = save_path {
            match save_result(&path, &report.result) {
                Ok(()) => {
                    info!(file = %path.display(), "result written");
                    report.saved_to = Some(path);
                }
                Err(err) => {
                    warn!(file = %path.display(), error = %format!("{err:#}"), "failed to write result");
                    report.save_error = Some(format!("{err:#}"));
                }
            }
        }

        Ok(report)
    }
}

pub fn extract_page(
    page: &FetchedPage,
    catalog: &Catalog,
    strategy: StrategyPreference,
) -> ScrapeResult {
    match page.kind {
        BodyKind::Text => {
            if strategy == StrategyPreference::DomWalk {
                warn!("dom_walk strategy requested for a plain text body; using regex sections");
            }
            extract(&PageInput::Text(&page.body), catalog)
        }
        BodyKind::Html => {
            let doc = Html::parse_document(&page.body);
            match strategy {
                StrategyPreference::Regex => {
                    let text = PageInput::Document(&doc).flattened_text().into_owned();
                    extract(&PageInput::Text(&text), catalog)
                }
                StrategyPreference::Auto | StrategyPreference::DomWalk => {
                    extract(&PageInput::Document(&doc), catalog)
                }
            }
        }
    }
}
