//! File-backed static asset store
//!
//! Reads allow-listed assets from a base directory, once per request.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::warn;

use crate::error::{ServerError, ServerResult};
use crate::traits::AssetStore;
use crate::types::Asset;

/// Asset store backed by a directory on the local file system.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    base_dir: PathBuf,
}

impl FsAssetStore {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn load(&self, asset: &Asset) -> ServerResult<Vec<u8>> {
        // Known constraint: the sitemap name comes from the request path
        // minus its leading slash and is joined verbatim, with no traversal
        // guard. Rejecting `..` or absolute names would change behavior for
        // legitimate sitemap-index files with unusual names.
        let path = self.base_dir.join(asset.relative_path());

        fs::read(&path).await.map_err(|source| {
            warn!(path = %path.display(), %source, "failed to read static asset");
            ServerError::AssetUnavailable {
                description: asset.description(),
                source,
            }
        })
    }
}

impl Default for FsAssetStore {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[tokio::test]
    async fn test_load_reads_exact_file_content() {
        let dir = fixture_dir();
        std::fs::write(dir.path().join("index.html"), "<html>hi</html>").unwrap();

        let store = FsAssetStore::new(dir.path());
        let content = store.load(&Asset::Index).await.unwrap();
        assert_eq!(content, b"<html>hi</html>");
    }

    #[tokio::test]
    async fn test_load_rereads_per_request() {
        let dir = fixture_dir();
        let path = dir.path().join("sitemap.xml");
        std::fs::write(&path, "v1").unwrap();

        let store = FsAssetStore::new(dir.path());
        let asset = Asset::Sitemap("sitemap.xml".to_string());
        assert_eq!(store.load(&asset).await.unwrap(), b"v1");

        std::fs::write(&path, "v2").unwrap();
        assert_eq!(store.load(&asset).await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_sitemap_name_is_used_verbatim() {
        let dir = fixture_dir();
        std::fs::write(dir.path().join("sitemapXYZ"), "entries").unwrap();

        let store = FsAssetStore::new(dir.path());
        let content = store
            .load(&Asset::Sitemap("sitemapXYZ".to_string()))
            .await
            .unwrap();
        assert_eq!(content, b"entries");
    }

    #[tokio::test]
    async fn test_missing_file_reports_asset_description() {
        let dir = fixture_dir();
        let store = FsAssetStore::new(dir.path());

        let err = store.load(&Asset::FaviconPng).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("unable to load favicon:"), "{message}");
    }
}
