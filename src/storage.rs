use crate::models::SalesRecord;
use anyhow::Result;
use csv::WriterBuilder;
use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix cells that a spreadsheet would evaluate as a formula with `'`.
pub fn neutralize_formula(cell: &str) -> Cow<'_, str> {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => Cow::Owned(format!("'{cell}")),
        _ => Cow::Borrowed(cell),
    }
}

/// Write records as CSV in the source layout (`Entity,Year,Electric cars sold`).
pub fn write_csv<W: Write>(records: &[SalesRecord], out: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(out);
    wtr.write_record(["Entity", "Year", "Electric cars sold"])?;
    for r in records {
        wtr.write_record([
            neutralize_formula(&r.entity).into_owned(),
            r.year.to_string(),
            r.cars_sold.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save records as CSV with header.
pub fn save_csv<P: AsRef<Path>>(records: &[SalesRecord], path: P) -> Result<()> {
    write_csv(records, File::create(path)?)
}

/// Save records as pretty JSON array.
pub fn save_json<P: AsRef<Path>>(records: &[SalesRecord], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(records)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let rows = vec![SalesRecord::new("Germany", 2020, 394_940)];
        save_csv(&rows, &csvp).unwrap();
        save_json(&rows, &jsonp).unwrap();
        assert!(csvp.exists());
        assert!(jsonp.exists());
    }

    #[test]
    fn plain_cells_are_untouched() {
        assert_eq!(neutralize_formula("Germany"), "Germany");
        assert_eq!(neutralize_formula("=1+1"), "'=1+1");
        assert_eq!(neutralize_formula(""), "");
    }
}
