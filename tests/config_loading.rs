use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use bakrun::config::{
    load_and_validate, load_or_init, save_to_path, validate_config, ConfigFile, HostEntry,
};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn missing_sections_fall_back_to_defaults() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("Bakrun.toml");
    fs::write(
        &path,
        r#"
[[host]]
hostname = "crabcake"
backup_paths = ["/home/me/documents"]
"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.settings.retention_limit, 3);
    assert_eq!(cfg.settings.copy_threads, 16);
    assert!(!cfg.settings.mirror);

    let host = cfg.host("crabcake").expect("host entry");
    assert_eq!(host.backup_paths, vec![PathBuf::from("/home/me/documents")]);
    assert!(host.destination().is_none());
    assert!(cfg.host("other").is_none());
    Ok(())
}

#[test]
fn rejects_a_zero_retention_limit() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("Bakrun.toml");
    fs::write(
        &path,
        r#"
[settings]
retention_limit = 0

[[host]]
hostname = "crabcake"
"#,
    )?;

    assert!(load_and_validate(&path).is_err());
    Ok(())
}

#[test]
fn rejects_duplicate_and_empty_hostnames() {
    let mut cfg = ConfigFile::default();
    cfg.hosts.push(HostEntry::new("crabcake"));
    cfg.hosts.push(HostEntry::new("crabcake"));
    assert!(validate_config(&cfg).is_err());

    let mut cfg = ConfigFile::default();
    cfg.hosts.push(HostEntry::new(""));
    assert!(validate_config(&cfg).is_err());
}

#[test]
fn load_or_init_creates_a_default_file() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("Bakrun.toml");
    assert!(!path.exists());

    let cfg = load_or_init(&path)?;
    assert!(path.exists());
    assert!(cfg.hosts.is_empty());

    // The created file parses and validates.
    let reloaded = load_and_validate(&path)?;
    assert_eq!(reloaded.settings.retention_limit, 3);
    Ok(())
}

#[test]
fn destination_selection_and_source_edits_round_trip() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("Bakrun.toml");

    let mut cfg = ConfigFile::default();
    let host = cfg.ensure_host("crabcake");
    host.select_destination(PathBuf::from("/mnt/backup"));
    assert!(host.add_backup_path(PathBuf::from("/home/me/documents")));
    // Duplicate sources are ignored.
    assert!(!host.add_backup_path(PathBuf::from("/home/me/documents")));
    save_to_path(&cfg, &path)?;

    let mut reloaded = load_and_validate(&path)?;
    {
        let host = reloaded.host("crabcake").expect("host entry");
        assert_eq!(host.destination(), Some(&PathBuf::from("/mnt/backup")));
        assert_eq!(host.dest_paths, vec![PathBuf::from("/mnt/backup")]);
        assert_eq!(host.backup_paths, vec![PathBuf::from("/home/me/documents")]);
    }

    let host = reloaded.host_mut("crabcake").expect("host entry");
    assert!(host.remove_backup_path(Path::new("/home/me/documents")));
    assert!(!host.remove_backup_path(Path::new("/home/me/documents")));
    assert!(host.backup_paths.is_empty());
    Ok(())
}

#[test]
fn destination_falls_back_to_the_first_known_dest() {
    let mut host = HostEntry::new("crabcake");
    host.dest_paths.push(PathBuf::from("/mnt/a"));
    host.dest_paths.push(PathBuf::from("/mnt/b"));
    assert_eq!(host.destination(), Some(&PathBuf::from("/mnt/a")));

    host.select_destination(PathBuf::from("/mnt/b"));
    assert_eq!(host.destination(), Some(&PathBuf::from("/mnt/b")));
    // Selecting an already-known destination must not duplicate it.
    assert_eq!(host.dest_paths.len(), 2);
}
