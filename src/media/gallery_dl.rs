use super::source::MediaSource;
use crate::profile::ProfileHandle;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

pub const DEFAULT_PROGRAM: &str = "gallery-dl";

/// Scrapes VSCO galleries through the `gallery-dl` command line tool.
pub struct GalleryDlSource {
    program: String,
}

impl GalleryDlSource {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GalleryDlSource {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

/// Pulls the media URLs out of `gallery-dl --dump-json` output.
///
/// The output is a JSON array of `[type, metadata]` and `[type, url, metadata]`
/// entries; only the latter carry media.
pub fn parse_dump(json_str: &str) -> Result<Vec<String>> {
    let json_array: Value =
        serde_json::from_str(json_str).context("Failed to parse gallery-dl output")?;

    let array = json_array
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("Invalid gallery-dl output format"))?;

    let urls: Vec<String> = array
        .iter()
        .filter_map(|item| item.as_array())
        .filter(|item| item.len() == 3)
        .filter_map(|item| item[1].as_str())
        .map(|url| url.to_string())
        .collect();

    if urls.is_empty() {
        return Err(anyhow::anyhow!("No media found for this profile"));
    }

    Ok(urls)
}

#[async_trait]
impl MediaSource for GalleryDlSource {
    fn name(&self) -> &'static str {
        "gallery-dl"
    }

    async fn get_media(&self, handle: &ProfileHandle, limit: usize) -> Result<Vec<String>> {
        let gallery_url = handle.gallery_url();
        info!("Fetching up to {} media items from {}", limit, gallery_url);

        let output = tokio::process::Command::new(&self.program)
            .arg("--dump-json")
            .arg("--range")
            .arg(format!("1-{limit}"))
            .arg(&gallery_url)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::anyhow!(
                "Profile media extraction failed: {}",
                error.trim()
            ));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        debug!("gallery-dl raw JSON output: {}", json_str);

        let urls = parse_dump(&json_str)?;
        debug!("Found {} media URLs for {}", urls.len(), handle);
        Ok(urls)
    }

    async fn test_availability(&self) -> bool {
        match tokio::process::Command::new(&self.program)
            .arg("--version")
            .output()
            .await
        {
            Ok(output) => {
                if output.status.success() {
                    let version = String::from_utf8_lossy(&output.stdout);
                    info!("✅ gallery-dl is available, version: {}", version.trim());
                    true
                } else {
                    warn!("❌ gallery-dl command failed");
                    false
                }
            }
            Err(e) => {
                warn!("❌ gallery-dl not found: {}", e);
                false
            }
        }
    }
}
