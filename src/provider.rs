//! Dataset acquisition: fresh cache, else remote, else stale cache, else fail.
//!
//! ```no_run
//! use evs_rs::{Config, DataProvider};
//!
//! let mut provider = DataProvider::from_config(&Config::default())?;
//! let acquired = provider.acquire()?;
//! println!("{} rows from {}", acquired.dataset.len(), acquired.origin);
//! # Ok::<(), evs_rs::DataError>(())
//! ```

use crate::api::{Client, Source};
use crate::cache::CacheArtifact;
use crate::config::Config;
use crate::error::{DataError, Result};
use crate::models::Dataset;
use crate::normalize::dataset_from_csv;
use log::{info, warn};
use std::fmt;
use std::time::{Duration, SystemTime};

/// Where an acquired dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Cache younger than the freshness threshold; no network access.
    FreshCache,
    /// Fetched from the remote source and written to the cache.
    Remote,
    /// Remote fetch failed; an existing (possibly stale) cache was used.
    CacheFallback,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::FreshCache => "fresh cache",
            Origin::Remote => "remote source",
            Origin::CacheFallback => "cache (remote unavailable)",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
    pub dataset: Dataset,
    pub origin: Origin,
}

/// Owns the cache artifact and its freshness policy, plus the dataset loaded
/// in the current session.
#[derive(Debug)]
pub struct DataProvider<S: Source = Client> {
    source: S,
    cache: CacheArtifact,
    max_age: Duration,
    force_refresh: bool,
    current: Option<Acquired>,
}

impl DataProvider<Client> {
    /// HTTP-backed provider using the URL, cache location and limits in `cfg`.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(
            Client::new(cfg)?,
            CacheArtifact::new(cfg.cache_path()),
            cfg.max_age,
        ))
    }
}

impl<S: Source> DataProvider<S> {
    pub fn new(source: S, cache: CacheArtifact, max_age: Duration) -> Self {
        Self {
            source,
            cache,
            max_age,
            force_refresh: false,
            current: None,
        }
    }

    pub fn cache(&self) -> &CacheArtifact {
        &self.cache
    }

    /// Drop the session dataset and make the next acquisition skip the
    /// freshness check. The cache file itself is kept for fallback.
    pub fn invalidate(&mut self) {
        info!("cache invalidated; next acquisition will contact {}", self.source.describe());
        self.current = None;
        self.force_refresh = true;
    }

    /// Dataset for this session, acquiring it on first use.
    pub fn dataset(&mut self) -> Result<Dataset> {
        if let Some(acq) = &self.current {
            return Ok(acq.dataset.clone());
        }
        Ok(self.acquire()?.dataset)
    }

    /// Run the acquisition policy against the wall clock.
    pub fn acquire(&mut self) -> Result<Acquired> {
        self.acquire_at(SystemTime::now())
    }

    /// Run the acquisition policy as if the current time were `now`.
    pub fn acquire_at(&mut self, now: SystemTime) -> Result<Acquired> {
        let bypass = std::mem::take(&mut self.force_refresh);
        let acquired = self.resolve(now, bypass)?;
        info!(
            "loaded {} rows from {}",
            acquired.dataset.len(),
            acquired.origin
        );
        self.current = Some(acquired.clone());
        Ok(acquired)
    }

    fn resolve(&self, now: SystemTime, bypass: bool) -> Result<Acquired> {
        if !bypass && self.cache.is_fresh_at(now, self.max_age)? {
            match self.load_cache() {
                Ok(dataset) => {
                    return Ok(Acquired {
                        dataset,
                        origin: Origin::FreshCache,
                    });
                }
                Err(e) => warn!(
                    "cached copy at {} is unusable, fetching again: {e}",
                    self.cache.path().display()
                ),
            }
        }

        match self.fetch_remote() {
            Ok(dataset) => Ok(Acquired {
                dataset,
                origin: Origin::Remote,
            }),
            Err(e) if e.is_fetch_failure() => {
                warn!("fetch from {} failed: {e}", self.source.describe());
                if !self.cache.exists() {
                    return Err(self.unavailable(e.to_string()));
                }
                match self.load_cache() {
                    Ok(dataset) => Ok(Acquired {
                        dataset,
                        origin: Origin::CacheFallback,
                    }),
                    Err(cache_err) => Err(self.unavailable(format!(
                        "{e}; cached copy unusable: {cache_err}"
                    ))),
                }
            }
            Err(e) => Err(e),
        }
    }

    fn unavailable(&self, cause: String) -> DataError {
        DataError::DataUnavailable {
            path: self.cache.path().to_path_buf(),
            cause,
        }
    }

    fn load_cache(&self) -> Result<Dataset> {
        dataset_from_csv(&self.cache.read()?)
    }

    /// Fetch, validate, then persist. A body that does not parse is a fetch
    /// failure and never replaces the cache.
    fn fetch_remote(&self) -> Result<Dataset> {
        let body = self.source.fetch()?;
        let dataset = dataset_from_csv(&body).map_err(|e| match e {
            DataError::InvalidPayload(_) => e,
            other => DataError::InvalidPayload(other.to_string()),
        })?;
        if let Err(e) = self.cache.write(&body) {
            // the fetched data is still good for this session
            warn!("could not update cache: {e}");
        }
        Ok(dataset)
    }
}

/// One-shot acquisition with the HTTP source described by `cfg`.
pub fn acquire_dataset(cfg: &Config) -> Result<Dataset> {
    Ok(DataProvider::from_config(cfg)?.acquire()?.dataset)
}
