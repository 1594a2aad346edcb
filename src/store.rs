use crate::model::ScrapeResult;
use anyhow::{Context, Result};
use std::path::Path;

pub fn load_result(path: &Path) -> Result<ScrapeResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read result file {}", path.display()))?;
    let result = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse result file {}", path.display()))?;
    Ok(result)
}

pub fn save_result(path: &Path, result: &ScrapeResult) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    let serialized = serde_json::to_string_pretty(result)?;
    std::fs::write(path, serialized)
        .with_context(|| format!("failed to write result file {}", path.display()))?;
    Ok(())
}
