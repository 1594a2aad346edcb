use crate::section::StrategyPreference;
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://arc-raiders.dev";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub path: Option<PathBuf>,
    pub config: AppConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        match self.fetch.mode {
            FetchMode::Http => {
                let base_url = self.fetch.base_url.trim();
                if base_url.is_empty() {
                    bail!("fetch.base_url is required for http mode");
                }
                Url::parse(base_url).with_context(|| format!("invalid fetch.base_url {base_url}"))?;
            }
            FetchMode::File => {
                if self.fetch.file_path.is_none() {
                    bail!("fetch.file_path is required for file mode");
                }
            }
            FetchMode::Inline => {
                if self.fetch.inline_data.is_none() {
                    bail!("fetch.inline_data is required for inline mode");
                }
            }
        }

        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be greater than zero");
        }
        if self.server.bind.trim().is_empty() {
            bail!("server.bind must not be empty");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    #[default]
    Http,
    File,
    Inline,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    #[default]
    Html,
    Text,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub mode: FetchMode,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub inline_data: Option<String>,
    #[serde(default)]
    pub body: BodyKind,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Http,
            base_url: default_base_url(),
            file_path: None,
            inline_data: None,
            body: BodyKind::Html,
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn inline(body: impl Into<String>, kind: BodyKind) -> Self {
        Self {
            mode: FetchMode::Inline,
            inline_data: Some(body.into()),
            body: kind,
            ..Self::default()
        }
    }

    pub fn file(path: impl Into<PathBuf>, kind: BodyKind) -> Self {
        Self {
            mode: FetchMode::File,
            file_path: Some(path.into()),
            body: kind,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExtractConfig {
    #[serde(default)]
    pub strategy: StrategyPreference,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub save_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    if !path.exists() {
        return Ok(LoadedConfig::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let mut config: AppConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse toml in {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;

    if let Some(file_path) = &config.fetch.file_path {
        config.fetch.file_path = Some(resolve_path(path, file_path)?);
    }

    Ok(LoadedConfig {
        path: Some(path.to_path_buf()),
        config,
    })
}

pub fn resolve_path(base_config_path: &Path, maybe_relative: &Path) -> Result<PathBuf> {
    if maybe_relative.is_absolute() {
        return Ok(maybe_relative.to_path_buf());
    }

    let parent = base_config_path.parent().ok_or_else(|| {
        anyhow!(
            "config has no parent directory: {}",
            base_config_path.display()
        )
    })?;

    Ok(parent.join(maybe_relative))
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_bind() -> String {
    "0.0.0.0:5001".to_string()
}
