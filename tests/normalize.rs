use evs_rs::models::{RawRecord, SalesRecord};
use evs_rs::normalize::{dataset_from_csv, normalize, parse_csv, to_dataset};

fn raw(entity: &str, year: i32, v: Option<f64>) -> RawRecord {
    RawRecord {
        entity: entity.into(),
        year,
        cars_sold: v,
    }
}

fn messy() -> Vec<RawRecord> {
    vec![
        raw("World", 2010, Some(7000.0)),
        raw("China", 2010, None),
        raw("Germany", 2010, Some(1500.7)),
        raw("Norway", 2010, Some(-3.0)),
        raw("France", 2010, Some(f64::NAN)),
        raw("Japan", 2010, Some(0.0)),
    ]
}

#[test]
fn normalization_is_idempotent() {
    let once = normalize(messy());
    let twice = normalize(once.clone());
    assert_eq!(once, twice);
    assert_eq!(to_dataset(once.clone()), to_dataset(twice));
}

#[test]
fn normalization_drops_missing_and_coerces() {
    let once = normalize(messy());
    let kept: Vec<(&str, Option<f64>)> = once.iter().map(|r| (r.entity.as_str(), r.cars_sold)).collect();
    assert_eq!(
        kept,
        vec![
            ("World", Some(7000.0)),
            ("Germany", Some(1500.0)),
            ("Japan", Some(0.0)),
        ]
    );
    let ds = to_dataset(messy());
    assert_eq!(ds.records()[1], SalesRecord::new("Germany", 2010, 1500));
    assert!(ds.iter().all(|r| r.entity != "China"));
}

#[test]
fn owid_layout_parses() {
    let csv = "Entity,Code,Year,Electric cars sold\n\
               China,CHN,2022,5900000\n\
               China,CHN,2023,\n\
               \"Korea, South\",KOR,2023,162000\n";
    let rows = parse_csv(csv.as_bytes()).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].entity, "Korea, South");

    let ds = dataset_from_csv(csv.as_bytes()).unwrap();
    assert_eq!(ds.len(), 2);
}

#[test]
fn header_only_payload_is_an_empty_dataset() {
    let ds = dataset_from_csv(b"Entity,Year,Electric cars sold\n").unwrap();
    assert!(ds.is_empty());
}
