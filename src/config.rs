//! Runtime settings for acquisition: where to fetch from, where to cache, and
//! how long a cached copy stays fresh.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Our World in Data CSV export of electric car sales by country.
pub const DEFAULT_SOURCE_URL: &str = "https://github.com/owid/owid-datasets/raw/master/datasets/Electric%20car%20sales%20-%20by%20country/Electric%20car%20sales%20-%20by%20country.csv";

/// File name of the cache artifact inside the cache directory.
pub const CACHE_FILE_NAME: &str = "ev_sales_global.csv";

/// A cached copy younger than this is used without touching the network.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Total request timeout for the remote fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source_url: String,
    pub cache_dir: PathBuf,
    pub max_age: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            cache_dir: default_cache_dir(),
            max_age: DEFAULT_MAX_AGE,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// `<platform data dir>/evs-rs`, or `./data` when the platform has none.
pub fn default_cache_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("evs-rs"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

impl Config {
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full path of the cache artifact.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let cfg = Config::default();
        assert_eq!(cfg.max_age.as_secs(), 604_800);
        assert_eq!(cfg.timeout.as_secs(), 30);
        assert!(cfg.source_url.ends_with(".csv"));
        assert!(cfg.cache_path().ends_with(CACHE_FILE_NAME));
    }

    #[test]
    fn setters_override_fields() {
        let cfg = Config::default()
            .with_cache_dir("/tmp/evs")
            .with_source_url("http://localhost:1/x.csv")
            .with_max_age(Duration::from_secs(60));
        assert_eq!(cfg.cache_path(), PathBuf::from("/tmp/evs").join(CACHE_FILE_NAME));
        assert_eq!(cfg.source_url, "http://localhost:1/x.csv");
        assert_eq!(cfg.max_age, Duration::from_secs(60));
    }
}
