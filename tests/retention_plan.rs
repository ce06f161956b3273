use std::error::Error;
use std::fs;
use std::path::Path;

use bakrun::retention::{
    backup_already_exists, extract_date, plan_deletions, snapshot_path, SNAPSHOT_PREFIX,
};
use chrono::NaiveDate;

type TestResult = Result<(), Box<dyn Error>>;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn mkdir(parent: &Path, name: &str) {
    fs::create_dir(parent.join(name)).expect("create test dir");
}

#[test]
fn keeps_the_limit_newest_snapshots() -> TestResult {
    let tmp = tempfile::tempdir()?;
    for day in 25..=30 {
        mkdir(tmp.path(), &format!("backup_2026-07-{day}"));
    }

    let plan = plan_deletions(tmp.path(), SNAPSHOT_PREFIX, 3, date(2026, 8, 6))?;

    let mut names: Vec<String> = plan
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["backup_2026-07-25", "backup_2026-07-26", "backup_2026-07-27"]
    );
    Ok(())
}

#[test]
fn skips_undated_foreign_and_log_entries() -> TestResult {
    let tmp = tempfile::tempdir()?;
    mkdir(tmp.path(), "backup_2026-01-02");
    mkdir(tmp.path(), "backup_2026-01-01");
    // None of these may ever be returned:
    mkdir(tmp.path(), "backup_misc"); // no date
    mkdir(tmp.path(), "export_2026-01-01"); // foreign prefix
    fs::write(tmp.path().join("backup_2026-01-01.log"), "old log")?; // log suffix
    fs::write(tmp.path().join("stray_2025-12-01.txt"), "stray")?; // standalone file

    let plan = plan_deletions(tmp.path(), SNAPSHOT_PREFIX, 1, date(2026, 8, 6))?;

    assert_eq!(plan.len(), 1);
    assert_eq!(
        plan[0].file_name().unwrap().to_string_lossy(),
        "backup_2026-01-01"
    );
    Ok(())
}

#[test]
fn never_returns_todays_populated_snapshot() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let today = date(2026, 8, 6);
    mkdir(tmp.path(), "backup_2026-08-06");
    fs::write(tmp.path().join("backup_2026-08-06").join("data.txt"), "x")?;

    // Even a limit of 0 must not delete the snapshot being written.
    let plan = plan_deletions(tmp.path(), SNAPSHOT_PREFIX, 0, today)?;

    assert!(plan.is_empty());
    Ok(())
}

#[test]
fn errors_on_missing_snapshot_parent() {
    let missing = Path::new("/definitely/not/a/real/parent");
    assert!(plan_deletions(missing, SNAPSHOT_PREFIX, 3, date(2026, 8, 6)).is_err());
}

#[test]
fn extracts_dates_in_several_shapes() {
    assert_eq!(extract_date("backup_2026-08-06"), Some(date(2026, 8, 6)));
    assert_eq!(extract_date("backup_2026_8_6"), Some(date(2026, 8, 6)));
    assert_eq!(extract_date("backup_06.08.2026"), Some(date(2026, 8, 6)));
    assert_eq!(extract_date("weekly-backup-2026.08.06-full"), Some(date(2026, 8, 6)));
    assert_eq!(extract_date("backup_misc"), None);
    assert_eq!(extract_date("backup_2026-13-40"), None);
}

#[test]
fn snapshot_layout_is_dest_host_prefix_date() {
    let path = snapshot_path(Path::new("/mnt/backup"), "crabcake", date(2026, 8, 6));
    assert_eq!(path, Path::new("/mnt/backup/crabcake/backup_2026-08-06"));
}

#[test]
fn detects_an_existing_populated_snapshot() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let today = date(2026, 8, 6);
    let host = "crabcake";

    assert!(!backup_already_exists(tmp.path(), host, today));

    let snapshot = snapshot_path(tmp.path(), host, today);
    fs::create_dir_all(&snapshot)?;
    // Empty snapshot: exists but holds nothing yet.
    assert!(!backup_already_exists(tmp.path(), host, today));

    fs::write(snapshot.join("data.txt"), "x")?;
    assert!(backup_already_exists(tmp.path(), host, today));
    Ok(())
}
