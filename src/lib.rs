//! evs_rs
//!
//! A lightweight Rust library for acquiring, caching, and analyzing global
//! electric-vehicle sales (Our World in Data, by country and year). Pairs with
//! the `evs` CLI.
//!
//! ### Features
//! - Fetch the dataset over HTTP with a 7-day on-disk cache and stale-cache fallback
//! - Clean it once into an immutable, cheaply clonable [`Dataset`]
//! - Global trend, top-N countries, per-country series, year bounds, summary statistics
//! - Country comparisons (pivot, growth, market share) and CSV/JSON export
//!
//! ### Example
//! ```no_run
//! use evs_rs::{Config, DataProvider, query, stats};
//!
//! let mut provider = DataProvider::from_config(&Config::default())?;
//! let data = provider.dataset()?;
//! let top = query::top_entities(&data, Some(2023), 5);
//! let summary = stats::summary_stats(&data);
//! println!("{top:?}\n{summary:#?}");
//! evs_rs::storage::save_csv(data.records(), "ev_sales.csv")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod cache;
pub mod compare;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod query;
pub mod stats;
pub mod storage;

pub use api::Client;
pub use config::Config;
pub use error::DataError;
pub use models::{Dataset, SalesRecord, YearPoint};
pub use provider::{Acquired, DataProvider, Origin, acquire_dataset};
