//! Side-by-side comparison of a handful of entities over a year range.

use crate::error::{DataError, Result};
use crate::models::{Dataset, YearPoint};
use crate::query::entity_series;
use crate::stats::total_growth;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound on the number of entities in one comparison.
pub const MAX_COMPARE: usize = 5;

/// Selection used when the caller does not pick any entities.
pub const DEFAULT_SELECTION: [&str; 3] = ["China", "United States", "Germany"];

/// Default start of the comparison window.
pub const DEFAULT_FROM_YEAR: i32 = 2015;

/// One year of the pivot: a cell per selected entity plus the row total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PivotRow {
    pub year: i32,
    /// Same order as [`Comparison::entities`]; `None` where the entity has no data.
    pub values: Vec<Option<u64>>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Insight {
    pub entity: String,
    pub total: u64,
    /// First-to-last change in the window; only defined with two or more points.
    pub growth_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Share {
    pub entity: String,
    pub cars_sold: u64,
    pub pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub entities: Vec<String>,
    pub from: i32,
    pub to: i32,
    /// Per-entity series clipped to `from..=to`.
    pub series: Vec<(String, Vec<YearPoint>)>,
    pub pivot: Vec<PivotRow>,
    pub insights: Vec<Insight>,
    /// Descending by sales, ties by name.
    pub market_share: Vec<Share>,
}

impl Comparison {
    pub fn is_empty(&self) -> bool {
        self.pivot.is_empty()
    }
}

/// Build the comparison for `entities` over `from..=to`.
///
/// Duplicate names are compared once. More than [`MAX_COMPARE`] distinct
/// entities is an error.
pub fn compare<S: AsRef<str>>(ds: &Dataset, entities: &[S], from: i32, to: i32) -> Result<Comparison> {
    let mut selected: Vec<String> = Vec::new();
    for e in entities {
        let e = e.as_ref().trim();
        if !e.is_empty() && !selected.iter().any(|s| s == e) {
            selected.push(e.to_string());
        }
    }
    if selected.len() > MAX_COMPARE {
        return Err(DataError::TooManyEntities {
            max: MAX_COMPARE,
            got: selected.len(),
        });
    }

    let series: Vec<(String, Vec<YearPoint>)> = selected
        .iter()
        .map(|e| {
            let pts = entity_series(ds, e)
                .into_iter()
                .filter(|p| (from..=to).contains(&p.year))
                .collect();
            (e.clone(), pts)
        })
        .collect();

    let mut grid: BTreeMap<i32, Vec<Option<u64>>> = BTreeMap::new();
    for (idx, (_, pts)) in series.iter().enumerate() {
        for p in pts {
            grid.entry(p.year).or_insert_with(|| vec![None; selected.len()])[idx] = Some(p.cars_sold);
        }
    }
    let pivot = grid
        .into_iter()
        .map(|(year, values)| PivotRow {
            year,
            total: values.iter().flatten().sum(),
            values,
        })
        .collect();

    let insights = series
        .iter()
        .map(|(e, pts)| Insight {
            entity: e.clone(),
            total: pts.iter().map(|p| p.cars_sold).sum(),
            growth_pct: total_growth(pts),
        })
        .collect::<Vec<_>>();

    let grand: u64 = insights.iter().map(|i| i.total).sum();
    let mut market_share: Vec<Share> = insights
        .iter()
        .filter(|i| i.total > 0)
        .map(|i| Share {
            entity: i.entity.clone(),
            cars_sold: i.total,
            pct: i.total as f64 / grand as f64 * 100.0,
        })
        .collect();
    market_share.sort_by(|a, b| b.cars_sold.cmp(&a.cars_sold).then_with(|| a.entity.cmp(&b.entity)));

    Ok(Comparison {
        entities: selected,
        from,
        to,
        series,
        pivot,
        insights,
        market_share,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalesRecord;

    fn sample() -> Dataset {
        [
            ("China", 2019, 1000),
            ("China", 2020, 1500),
            ("Germany", 2020, 500),
            ("Germany", 2021, 700),
            ("Norway", 2021, 100),
        ]
        .into_iter()
        .map(|(e, y, v)| SalesRecord::new(e, y, v))
        .collect()
    }

    #[test]
    fn pivot_aligns_years_and_totals() {
        let c = compare(&sample(), &["China", "Germany"], 2020, 2021).unwrap();
        assert_eq!(c.pivot.len(), 2);
        assert_eq!(c.pivot[0], PivotRow { year: 2020, values: vec![Some(1500), Some(500)], total: 2000 });
        assert_eq!(c.pivot[1], PivotRow { year: 2021, values: vec![None, Some(700)], total: 700 });
    }

    #[test]
    fn insights_need_two_points_for_growth() {
        let c = compare(&sample(), &["China", "Germany"], 2020, 2021).unwrap();
        assert_eq!(c.insights[0].growth_pct, None);
        assert!((c.insights[1].growth_pct.unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn market_share_sums_to_hundred() {
        let c = compare(&sample(), &["Norway", "Germany", "China"], 2019, 2021).unwrap();
        assert_eq!(c.market_share[0].entity, "China");
        let sum: f64 = c.market_share.iter().map(|s| s.pct).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn selection_is_bounded_and_deduplicated() {
        let six = ["A", "B", "C", "D", "E", "F"];
        assert!(matches!(
            compare(&sample(), &six, 2010, 2030),
            Err(DataError::TooManyEntities { max: 5, got: 6 })
        ));
        let c = compare(&sample(), &["China", "China"], 2010, 2030).unwrap();
        assert_eq!(c.entities, vec!["China"]);
    }
}
