//! Summary and growth statistics computed over a [`Dataset`] or a single series.

use crate::models::{Dataset, YearPoint};
use crate::query::{entity_list, entity_series, global_trend, total_sales, year_bounds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Headline numbers for the overview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total_sales: u64,
    /// Distinct countries, aggregates excluded.
    pub countries: usize,
    pub year_range: Option<(i32, i32)>,
    /// Mean year-over-year growth of the `World` series, in percent.
    pub avg_annual_growth: f64,
}

/// One row of a year-over-year table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GrowthRow {
    pub year: i32,
    pub cars_sold: u64,
    /// Absolute change vs the previous point; `None` for the first.
    pub change: Option<i64>,
    /// Percent change vs the previous point; `None` for the first or when the previous was 0.
    pub growth_pct: Option<f64>,
}

/// Inclusive year range with a display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Period {
    pub label: String,
    pub start: i32,
    pub end: i32,
}

impl Period {
    pub fn new(start: i32, end: i32) -> Self {
        Self {
            label: format!("{start}-{end}"),
            start,
            end,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityDetail {
    pub entity: String,
    pub total: u64,
    pub mean_annual: f64,
    pub years: usize,
}

/// Shape of the whole table, for the download view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetInfo {
    pub rows: usize,
    /// Distinct entities including aggregates.
    pub entities: usize,
    pub year_range: Option<(i32, i32)>,
    pub total_sales: u64,
}

/// Percent change from `prev` to `cur`; undefined when `prev` is 0.
pub fn pct_change(prev: u64, cur: u64) -> Option<f64> {
    if prev == 0 {
        None
    } else {
        Some((cur as f64 - prev as f64) / prev as f64 * 100.0)
    }
}

fn step_changes(series: &[YearPoint]) -> impl Iterator<Item = Option<f64>> + '_ {
    series
        .windows(2)
        .map(|w| pct_change(w[0].cars_sold, w[1].cars_sold))
}

/// Mean of the defined per-step percent changes; 0 with fewer than two points.
pub fn average_growth(series: &[YearPoint]) -> f64 {
    let steps: Vec<f64> = step_changes(series).flatten().collect();
    if steps.is_empty() {
        0.0
    } else {
        steps.iter().sum::<f64>() / steps.len() as f64
    }
}

pub fn summary_stats(ds: &Dataset) -> Summary {
    Summary {
        total_sales: total_sales(ds),
        countries: entity_list(ds).len(),
        year_range: year_bounds(ds),
        avg_annual_growth: average_growth(&global_trend(ds)),
    }
}

pub fn growth_table(series: &[YearPoint]) -> Vec<GrowthRow> {
    let mut out = Vec::with_capacity(series.len());
    let mut prev: Option<u64> = None;
    for p in series {
        out.push(GrowthRow {
            year: p.year,
            cars_sold: p.cars_sold,
            change: prev.map(|v| p.cars_sold as i64 - v as i64),
            growth_pct: prev.and_then(|v| pct_change(v, p.cars_sold)),
        });
        prev = Some(p.cars_sold);
    }
    out
}

/// Last row of the growth table (latest year, its sales and change).
pub fn latest_change(series: &[YearPoint]) -> Option<GrowthRow> {
    growth_table(series).pop()
}

/// Percent change from the first to the last point.
pub fn total_growth(series: &[YearPoint]) -> Option<f64> {
    match (series.first(), series.last()) {
        (Some(a), Some(b)) if series.len() > 1 => pct_change(a.cars_sold, b.cars_sold),
        _ => None,
    }
}

/// Year with the highest year-over-year percent change.
pub fn peak_growth(series: &[YearPoint]) -> Option<(i32, f64)> {
    growth_table(series)
        .into_iter()
        .filter_map(|r| r.growth_pct.map(|g| (r.year, g)))
        .fold(None, |best, cur| match best {
            Some((_, g)) if g >= cur.1 => best,
            _ => Some(cur),
        })
}

/// 2010-2015, 2016-2020 and 2021 through `latest`.
pub fn default_periods(latest: i32) -> Vec<Period> {
    vec![
        Period::new(2010, 2015),
        Period::new(2016, 2020),
        Period::new(2021, latest.max(2021)),
    ]
}

pub fn period_totals(series: &[YearPoint], periods: &[Period]) -> Vec<(Period, u64)> {
    periods
        .iter()
        .map(|p| {
            let sum: u64 = series
                .iter()
                .filter(|pt| p.contains(pt.year))
                .map(|pt| pt.cars_sold)
                .sum();
            (p.clone(), sum)
        })
        .collect()
}

/// Leader's share of the ranking's combined total, in percent.
pub fn top_share(ranking: &[(String, u64)]) -> Option<f64> {
    let total: u64 = ranking.iter().map(|(_, v)| v).sum();
    let (_, lead) = ranking.first()?;
    if total == 0 {
        None
    } else {
        Some(*lead as f64 / total as f64 * 100.0)
    }
}

pub fn entity_detail(ds: &Dataset, entity: &str) -> Option<EntityDetail> {
    let series = entity_series(ds, entity);
    if series.is_empty() {
        return None;
    }
    let total: u64 = series.iter().map(|p| p.cars_sold).sum();
    Some(EntityDetail {
        entity: entity.to_string(),
        total,
        mean_annual: total as f64 / series.len() as f64,
        years: series.len(),
    })
}

pub fn dataset_info(ds: &Dataset) -> DatasetInfo {
    DatasetInfo {
        rows: ds.len(),
        entities: ds
            .iter()
            .map(|r| r.entity.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
        year_range: year_bounds(ds),
        total_sales: total_sales(ds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(vals: &[(i32, u64)]) -> Vec<YearPoint> {
        vals.iter()
            .map(|&(year, cars_sold)| YearPoint { year, cars_sold })
            .collect()
    }

    #[test]
    fn growth_skips_zero_base() {
        let s = series(&[(2010, 0), (2011, 100), (2012, 150)]);
        // only 2011->2012 is defined
        assert!((average_growth(&s) - 50.0).abs() < 1e-9);
        let t = growth_table(&s);
        assert_eq!(t[1].change, Some(100));
        assert_eq!(t[1].growth_pct, None);
    }

    #[test]
    fn peak_prefers_earliest_on_tie() {
        let s = series(&[(2010, 100), (2011, 200), (2012, 400), (2013, 200)]);
        assert_eq!(peak_growth(&s), Some((2011, 100.0)));
    }

    #[test]
    fn periods_are_inclusive() {
        let s = series(&[(2015, 1), (2016, 2), (2020, 3), (2021, 4), (2023, 5)]);
        let totals = period_totals(&s, &default_periods(2023));
        let sums: Vec<u64> = totals.iter().map(|(_, v)| *v).collect();
        assert_eq!(sums, vec![1, 5, 9]);
        assert_eq!(totals[2].0.label, "2021-2023");
    }
}
