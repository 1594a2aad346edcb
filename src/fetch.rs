use crate::config::{BodyKind, FetchConfig, FetchMode};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid fetch configuration: {0}")]
    Config(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} failed with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read page file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub source_url: String,
    pub body: String,
    pub kind: BodyKind,
}

#[derive(Debug)]
pub struct Fetcher {
    config: FetchConfig,
    client: Option<Client>,
}

impl Fetcher {
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = match config.mode {
            FetchMode::Http => Some(build_client(config)?),
            FetchMode::File | FetchMode::Inline => None,
        };
        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    pub fn fetch_page(&self) -> Result<FetchedPage, FetchError> {
        match self.config.mode {
            FetchMode::Http => self.fetch_http(),
            FetchMode::File => self.fetch_file(),
            FetchMode::Inline => self.fetch_inline(),
        }
    }

    fn fetch_http(&self) -> Result<FetchedPage, FetchError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| FetchError::Config("http client not initialised".to_string()))?;
        let url = self.config.base_url.as_str();

        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let resp = client.get(url).send().map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let body = resp.text().map_err(transport)?;

        info!(%url, bytes = body.len(), "fetched page");
        Ok(FetchedPage {
            source_url: url.to_string(),
            body,
            kind: self.config.body,
        })
    }

    fn fetch_file(&self) -> Result<FetchedPage, FetchError> {
        let path = self
            .config
            .file_path
            .as_ref()
            .ok_or_else(|| FetchError::Config("fetch.file_path missing for file mode".into()))?;
        let body = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;

        info!(file = %path.display(), bytes = body.len(), "loaded page file");
        Ok(FetchedPage {
            source_url: format!("file://{}", path.display()),
            body,
            kind: self.config.body,
        })
    }

    fn fetch_inline(&self) -> Result<FetchedPage, FetchError> {
        let body = self
            .config
            .inline_data
            .clone()
            .ok_or_else(|| FetchError::Config("fetch.inline_data missing for inline mode".into()))?;

        debug!(bytes = body.len(), "loaded inline page");
        Ok(FetchedPage {
            source_url: "inline://page".to_string(),
            body,
            kind: self.config.body,
        })
    }
}

fn build_client(config: &FetchConfig) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    for (k, v) in &config.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|_| FetchError::Config(format!("invalid header name {k}")))?;
        let value = HeaderValue::from_str(v)
            .map_err(|_| FetchError::Config(format!("invalid header value for {k}")))?;
        headers.insert(name, value);
    }
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent)
            .map_err(|_| FetchError::Config("invalid user agent".to_string()))?,
    );

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|source| FetchError::Transport {
            url: config.base_url.clone(),
            source,
        })
}
