//! Local cache for remote sales sources.
//!
//! A sales source is either a path on disk or an `http(s)://` URL. Remote
//! files are downloaded once into the cache directory and reused on later
//! loads until a refresh is requested.

use crate::config;
use crate::error::{DashboardError, Result};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolves sales sources to local files, downloading remote ones.
pub struct SourceCache {
    /// Directory where downloaded sources are stored.
    pub cache_dir: PathBuf,
    /// If true, never download (use cached files only).
    pub offline: bool,
    timeout: Duration,
    client: Option<Client>,
}

impl SourceCache {
    /// Create a new source cache.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache directory.
    /// Creates the cache directory if it does not exist.
    pub fn new(cache_dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline,
            timeout,
            client: None,
        })
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<Client> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Whether `source` names a remote file rather than a local path.
    pub fn is_remote(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    /// Local path a remote source is cached under.
    ///
    /// The file name is a digest of the URL (fragment excluded) followed by
    /// its last path segment, so distinct URLs never share a cached file.
    pub fn cached_path(&self, url: &str) -> PathBuf {
        let without_fragment = url.split('#').next().unwrap_or(url);
        let path_only = without_fragment.split('?').next().unwrap_or(without_fragment);
        let name = path_only
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or("source.csv");

        let mut hasher = Sha256::new();
        hasher.update(without_fragment.as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        self.cache_dir
            .join("sources")
            .join(format!("{}-{}", &digest[..16], name))
    }

    /// Resolve a source to a readable local file.
    ///
    /// Local paths must already exist. URLs are downloaded when no cached
    /// copy exists or `refresh` is set.
    pub fn resolve(&mut self, source: &str, refresh: bool) -> Result<PathBuf> {
        if !Self::is_remote(source) {
            let path = PathBuf::from(source);
            if !path.is_file() {
                return Err(DashboardError::NotFound(format!(
                    "Sales file {} does not exist",
                    path.display()
                )));
            }
            return Ok(path);
        }

        let local_path = self.cached_path(source);
        if local_path.exists() && (!refresh || self.offline) {
            return Ok(local_path);
        }
        if self.offline {
            return Err(DashboardError::NotFound(format!(
                "Source {} not cached and offline mode is enabled",
                source
            )));
        }
        self.download_file(source, &local_path)?;
        Ok(local_path)
    }

    /// Download a single file.
    ///
    /// Downloads to a temp file first and renames on success, so an
    /// interrupted download never leaves a corrupt partial file behind.
    fn download_file(&mut self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!(url, "downloading sales source");

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_dest = dest.with_extension(format!(
            "{}.tmp",
            dest.extension().and_then(|e| e.to_str()).unwrap_or("")
        ));

        let client = self.client()?;
        let result = (|| -> Result<()> {
            let resp = client.get(url).send()?.error_for_status()?;
            let bytes = resp.bytes()?;
            fs::write(&tmp_dest, &bytes)?;
            fs::rename(&tmp_dest, dest)?;
            Ok(())
        })();

        if let Err(e) = &result {
            tracing::warn!(url, error = %e, "download failed");
            let _ = fs::remove_file(&tmp_dest);
        }

        result
    }

    /// Remove all cached files and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Close the HTTP client, if open.
    pub fn close(&mut self) {
        self.client = None;
    }
}
