//! Record types for the sales table and the immutable [`Dataset`] handle.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Rollup entities present in the source data. They are not countries and
/// would double-count if ranked next to them.
pub const AGGREGATE_ENTITIES: [&str; 4] = ["World", "Europe", "Rest of World", "European Union (27)"];

/// Entity holding the global total.
pub const WORLD: &str = "World";

/// True when `entity` is one of [`AGGREGATE_ENTITIES`].
pub fn is_aggregate(entity: &str) -> bool {
    AGGREGATE_ENTITIES.contains(&entity)
}

/// Row as read from the CSV payload, before normalization.
///
/// Extra source columns (e.g. `Code`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    #[serde(rename = "Entity")]
    pub entity: String,
    #[serde(rename = "Year")]
    pub year: i32,
    /// Empty or unparseable cells become `None`.
    #[serde(rename = "Electric cars sold", default, deserialize_with = "de_count")]
    pub cars_sold: Option<f64>,
}

/// Serde helper: parse a count from a string cell that may be empty, an
/// integer (`"1250"`) or a float (`"1250.0"`). Anything else is treated as missing.
fn de_count<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let s = s.trim();
        if s.is_empty() {
            None
        } else {
            s.parse::<f64>().ok()
        }
    }))
}

/// Normalized row: one entity, one year, a defined non-negative count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SalesRecord {
    #[serde(rename = "Entity")]
    pub entity: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Electric cars sold")]
    pub cars_sold: u64,
}

impl SalesRecord {
    pub fn new(entity: impl Into<String>, year: i32, cars_sold: u64) -> Self {
        Self {
            entity: entity.into(),
            year,
            cars_sold,
        }
    }
}

/// One point of a per-entity time series. Duplicate `(entity, year)` rows are
/// summed into a single point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearPoint {
    pub year: i32,
    pub cars_sold: u64,
}

/// Immutable, cheaply clonable table of normalized sales records.
///
/// Row order is the order of the source file; query functions impose their own
/// ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    records: Arc<[SalesRecord]>,
}

impl Dataset {
    /// Wrap already-normalized records. Use [`crate::normalize::to_dataset`]
    /// for raw rows.
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SalesRecord> {
        self.records.iter()
    }
}

impl FromIterator<SalesRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = SalesRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a SalesRecord;
    type IntoIter = std::slice::Iter<'a, SalesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
