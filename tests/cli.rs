use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

// Nothing listens on the discard port; any accidental network use fails fast.
const DEAD_URL: &str = "http://127.0.0.1:9/ev.csv";

const SEED: &str = "Entity,Code,Year,Electric cars sold\n\
World,OWID_WRL,2021,6600000\n\
World,OWID_WRL,2022,10000000\n\
World,OWID_WRL,2023,14000000\n\
China,CHN,2021,3300000\n\
China,CHN,2022,5900000\n\
China,CHN,2023,8100000\n\
Germany,DEU,2021,680000\n\
Germany,DEU,2022,830000\n\
Germany,DEU,2023,700000\n\
Norway,NOR,2023,\n\
Europe,,2023,3200000\n";

/// Command with a freshly written (hence fresh) cache in `dir`.
fn evs(dir: &Path) -> Command {
    fs::write(dir.join("ev_sales_global.csv"), SEED).unwrap();
    let mut cmd = Command::cargo_bin("evs").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--cache-dir")
        .arg(dir)
        .arg("--url")
        .arg(DEAD_URL);
    cmd
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("evs").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("evs"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn countries_excludes_aggregates() {
    let dir = tempfile::tempdir().unwrap();
    evs(dir.path())
        .arg("countries")
        .assert()
        .success()
        .stdout("China\nGermany\n");
}

#[test]
fn top_for_a_year() {
    let dir = tempfile::tempdir().unwrap();
    evs(dir.path())
        .args(["top", "--year", "2023", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("China"))
        .stdout(predicate::str::contains("8,100,000"))
        .stdout(predicate::str::contains("Germany").not());
}

#[test]
fn overview_uses_locale() {
    let dir = tempfile::tempdir().unwrap();
    evs(dir.path())
        .args(["overview", "--locale", "de"])
        .assert()
        .success()
        .stdout(predicate::str::contains("14.000.000"))
        .stdout(predicate::str::contains("Countries:            2"));
}

#[test]
fn compare_rejects_more_than_five() {
    let dir = tempfile::tempdir().unwrap();
    evs(dir.path())
        .args(["compare", "--countries", "A,B,C,D,E,F"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 5"));
}

#[test]
fn compare_defaults_print_pivot() {
    let dir = tempfile::tempdir().unwrap();
    evs(dir.path())
        .arg("compare")
        .assert()
        .success()
        .stdout(predicate::str::contains("Market share"))
        .stdout(predicate::str::contains("2021"));
}

#[test]
fn download_writes_full_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("export.json");
    evs(dir.path())
        .args(["explore", "download", "--out"])
        .arg(&out)
        .assert()
        .success();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    // Norway row without a count is dropped
    assert_eq!(v.as_array().unwrap().len(), 10);
}

#[test]
fn missing_data_is_a_blocking_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("evs").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--cache-dir")
        .arg(dir.path())
        .arg("--url")
        .arg(DEAD_URL)
        .arg("countries");
    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no data available"));
}

#[test]
fn refresh_falls_back_to_cache_when_offline() {
    let dir = tempfile::tempdir().unwrap();
    evs(dir.path())
        .arg("refresh")
        .assert()
        .success()
        .stdout(predicate::str::contains("remote unavailable"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn fetch_online_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("evs").unwrap();
    cmd.arg("--cache-dir").arg(dir.path()).args(["top", "-n", "3"]);
    cmd.assert().success();
    assert!(dir.path().join("ev_sales_global.csv").is_file());
}
