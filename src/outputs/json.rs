//! JSON feed persistence.
//!
//! Feeds are written pretty-printed (two-space indent) to a fixed path,
//! replacing whatever was there. The write is not atomic: the slideshow
//! tolerates a missing or stale file, so no temp-file-and-rename is done.

use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `feed` and write it to `path`, creating parent directories
/// as needed.
///
/// # Errors
///
/// Returns an error if serialization, directory creation, or the write
/// itself fails.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_feed<T: Serialize>(feed: &T, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(feed)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    let bytes = json.len();
    fs::write(path, json).await?;
    info!(bytes, "Wrote feed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetFeed;

    fn feed(assets: &[&str]) -> AssetFeed {
        AssetFeed::new(
            "2025-12-15T08:00:00.000000".to_string(),
            "eBird Top Photos (Last 7 Days)",
            assets.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_write_feed_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("birdslide").join("assets.json");

        write_feed(&feed(&["629849023"]), &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"count\": 1"));
        let parsed: AssetFeed = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.assets, vec!["629849023"]);
    }

    #[tokio::test]
    async fn test_write_feed_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");

        write_feed(&feed(&["111111111", "222222222", "333333333"]), &path)
            .await
            .unwrap();
        write_feed(&feed(&["444444444"]), &path).await.unwrap();

        let parsed: AssetFeed =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.count, 1);
        assert_eq!(parsed.assets, vec!["444444444"]);
    }
}
