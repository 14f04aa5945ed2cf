//! CSV parsing and the one-time cleaning step applied after acquisition.
//!
//! - [`parse_csv`] reads the raw payload into [`RawRecord`]s, checking the required headers
//! - [`normalize`] drops rows without a usable sales count and coerces counts to whole numbers
//! - [`to_dataset`] runs `normalize` and freezes the result into a [`Dataset`]

use crate::error::{DataError, Result};
use crate::models::{Dataset, RawRecord, SalesRecord};
use csv::ReaderBuilder;
use log::{debug, warn};

/// Column headers the payload must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Entity", "Year", "Electric cars sold"];

/// Parse a CSV payload.
///
/// Rows that cannot be decoded at all (e.g. a non-numeric `Year`) are skipped
/// and reported in the log; a missing required header is an `InvalidPayload`.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(DataError::InvalidPayload(format!(
            "missing column(s): {}",
            missing.join(", ")
        )));
    }

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for row in rdr.deserialize::<RawRecord>() {
        match row {
            Ok(r) => out.push(r),
            Err(e) => {
                skipped += 1;
                debug!("skipping undecodable row: {e}");
            }
        }
    }
    if skipped > 0 {
        warn!("skipped {skipped} undecodable row(s) while parsing dataset");
    }
    Ok(out)
}

/// Drop rows lacking a sales count and coerce counts to non-negative whole numbers.
///
/// Fractional counts are truncated; negative and non-finite counts count as
/// missing. Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(rows: Vec<RawRecord>) -> Vec<RawRecord> {
    let before = rows.len();
    let out: Vec<RawRecord> = rows
        .into_iter()
        .filter_map(|mut r| {
            let v = r.cars_sold?;
            if !v.is_finite() || v < 0.0 {
                return None;
            }
            r.cars_sold = Some(v.trunc());
            Some(r)
        })
        .collect();
    let dropped = before - out.len();
    if dropped > 0 {
        debug!("dropped {dropped} row(s) without a sales count");
    }
    out
}

/// Normalize raw rows and freeze them into an immutable [`Dataset`].
pub fn to_dataset(rows: Vec<RawRecord>) -> Dataset {
    normalize(rows)
        .into_iter()
        .filter_map(|r| {
            let count = r.cars_sold?;
            Some(SalesRecord {
                entity: r.entity,
                year: r.year,
                cars_sold: count as u64,
            })
        })
        .collect()
}

/// Parse and normalize in one step.
pub fn dataset_from_csv(bytes: &[u8]) -> Result<Dataset> {
    Ok(to_dataset(parse_csv(bytes)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Entity,Code,Year,Electric cars sold\n\
        World,OWID_WRL,2010,7000\n\
        China,CHN,2010,\n\
        Germany,DEU,2010,1500.0\n\
        Norway,NOR,twenty,12\n";

    #[test]
    fn parses_and_ignores_extra_columns() {
        let rows = parse_csv(SAMPLE.as_bytes()).unwrap();
        // the "twenty" row is undecodable and skipped
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].entity, "World");
        assert_eq!(rows[1].cars_sold, None);
        assert_eq!(rows[2].cars_sold, Some(1500.0));
    }

    #[test]
    fn missing_header_is_invalid_payload() {
        let err = parse_csv(b"<html><body>rate limited</body></html>").unwrap_err();
        assert!(matches!(err, DataError::InvalidPayload(_)), "{err:?}");
    }

    #[test]
    fn dataset_only_keeps_counted_rows() {
        let ds = dataset_from_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1], SalesRecord::new("Germany", 2010, 1500));
    }
}
