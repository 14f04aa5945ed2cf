//! Synchronous client for the remote CSV source.
//!
//! One GET per call, bounded by a total timeout (30s by default) and a shorter
//! connect timeout. No retries: a failed fetch is handed back to
//! [`crate::provider::DataProvider`], which falls back to the cached copy.
//!
//! Typical usage:
//! ```no_run
//! # use evs_rs::{Client, Config};
//! # use evs_rs::api::Source;
//! let client = Client::new(&Config::default())?;
//! let body = client.fetch()?;
//! # Ok::<(), evs_rs::DataError>(())
//! ```

use crate::config::Config;
use crate::error::{DataError, Result};
use log::debug;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::time::Duration;

/// Anything that can produce the raw CSV payload.
///
/// Implemented by [`Client`] for HTTP; tests substitute in-memory sources.
pub trait Source {
    /// Fetch the full payload. Errors must be one of the fetch-failure
    /// variants of [`DataError`].
    fn fetch(&self) -> Result<Vec<u8>>;

    /// Human-readable location, used in log lines.
    fn describe(&self) -> String;
}

impl<S: Source + ?Sized> Source for &S {
    fn fetch(&self) -> Result<Vec<u8>> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    /// Build a client from the URL and timeouts in `cfg`.
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout) // total request timeout
            .connect_timeout(cfg.connect_timeout)
            .redirect(Policy::limited(5)) // the OWID URL redirects to raw content
            .user_agent(concat!("evs_rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::FetchTransport(format!("client build: {e}")))?;
        Ok(Self {
            url: cfg.source_url.clone(),
            timeout: cfg.timeout,
            http,
        })
    }

    fn classify(&self, e: reqwest::Error) -> DataError {
        if e.is_timeout() {
            DataError::FetchTimeout(self.timeout)
        } else if let Some(status) = e.status() {
            DataError::HttpStatus(status.as_u16())
        } else {
            DataError::FetchTransport(e.to_string())
        }
    }
}

impl Source for Client {
    fn fetch(&self) -> Result<Vec<u8>> {
        debug!("GET {}", self.url);
        let resp = self.http.get(&self.url).send().map_err(|e| self.classify(e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus(status.as_u16()));
        }
        let body = resp.bytes().map_err(|e| self.classify(e))?;
        debug!("received {} bytes from {}", body.len(), self.url);
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
