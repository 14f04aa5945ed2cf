//! Pure views over a [`Dataset`].
//!
//! Every function here borrows the dataset, never mutates it, and imposes its
//! own ordering. Duplicate `(entity, year)` rows are summed.

use crate::models::{Dataset, WORLD, YearPoint, is_aggregate};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Time series of one entity, ascending by year, duplicates summed.
pub fn entity_series(ds: &Dataset, entity: &str) -> Vec<YearPoint> {
    let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
    for r in ds.iter().filter(|r| r.entity == entity) {
        *by_year.entry(r.year).or_default() += r.cars_sold;
    }
    by_year
        .into_iter()
        .map(|(year, cars_sold)| YearPoint { year, cars_sold })
        .collect()
}

/// The `World` series, ascending by year.
pub fn global_trend(ds: &Dataset) -> Vec<YearPoint> {
    entity_series(ds, WORLD)
}

/// Up to `n` countries by summed sales, descending.
///
/// Aggregate entities are excluded. With `year` set only that year is summed,
/// otherwise all years are. Equal totals are ordered by entity name ascending,
/// so `top_entities(ds, y, a)` is always a prefix of `top_entities(ds, y, b)`
/// for `a < b`.
pub fn top_entities(ds: &Dataset, year: Option<i32>, n: usize) -> Vec<(String, u64)> {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for r in ds.iter() {
        if is_aggregate(&r.entity) || year.is_some_and(|y| r.year != y) {
            continue;
        }
        *totals.entry(r.entity.as_str()).or_default() += r.cars_sold;
    }
    let mut ranked: Vec<(&str, u64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(e, t)| (e.to_string(), t))
        .collect()
}

/// Sorted distinct country names (aggregates excluded).
pub fn entity_list(ds: &Dataset) -> Vec<String> {
    ds.iter()
        .map(|r| r.entity.as_str())
        .filter(|e| !is_aggregate(e))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// `(min year, max year)` over the whole dataset; `None` when empty.
pub fn year_bounds(ds: &Dataset) -> Option<(i32, i32)> {
    let min = ds.iter().map(|r| r.year).min()?;
    let max = ds.iter().map(|r| r.year).max()?;
    Some((min, max))
}

/// Sum of all sales counts (aggregate rows included, as in the source table).
pub fn total_sales(ds: &Dataset) -> u64 {
    ds.iter().map(|r| r.cars_sold).sum()
}
