use std::fs;
use std::path::Path;

use assert_cmd::Command;
use chrono::{Days, Utc};
use predicates::prelude::*;
use tempfile::TempDir;

use rotabak::backup::mirror_destination;

fn rotabak(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rotabak").unwrap();
    cmd.env("ROTABAK_CONFIG_DIR", config_dir)
        .env_remove("ROTABAK_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn label(days_ago: u64) -> String {
    let date = Utc::now().date_naive() - Days::new(days_ago);
    date.format("%Y-%m-%d").to_string()
}

#[test]
fn run_backs_up_and_prunes() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("backups");
    let source = temp.path().join("srv/app");
    fs::create_dir_all(&root).unwrap();
    fs::create_dir_all(source.join("conf")).unwrap();
    fs::write(source.join("conf/app.toml"), "port = 80").unwrap();

    let expired = root.join(label(2));
    let kept = root.join(label(1));
    fs::create_dir_all(&expired).unwrap();
    fs::create_dir_all(&kept).unwrap();

    rotabak(&temp.path().join("cfg"))
        .arg("run")
        .arg("--root")
        .arg(&root)
        .arg("--source")
        .arg(&source)
        .args(["--retention", "2", "--time-zone", "UTC", "--engine", "native"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup complete"));

    let copied = mirror_destination(&root.join(label(0)), &source.canonicalize().unwrap());
    assert_eq!(
        fs::read_to_string(copied.join("conf/app.toml")).unwrap(),
        "port = 80"
    );
    assert!(!expired.exists());
    assert!(kept.exists());
}

#[test]
fn run_without_root_names_missing_setter() {
    let temp = TempDir::new().unwrap();

    rotabak(temp.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("set_root_path"));
}

#[test]
fn run_rejects_missing_source() {
    let temp = TempDir::new().unwrap();

    rotabak(temp.path())
        .arg("run")
        .arg("--root")
        .arg(temp.path())
        .arg("--source")
        .arg(temp.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn run_rejects_zero_retention() {
    let temp = TempDir::new().unwrap();

    rotabak(temp.path())
        .args(["run", "--retention", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid number of days"));
}

#[test]
fn plan_does_not_touch_filesystem() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("backups");
    fs::create_dir_all(&root).unwrap();

    rotabak(&temp.path().join("cfg"))
        .arg("plan")
        .arg("--root")
        .arg(&root)
        .arg("--source")
        .arg(temp.path())
        .args(["--retention", "7", "--time-zone", "UTC"])
        .assert()
        .success()
        .stdout(predicate::str::contains(label(7)))
        .stdout(predicate::str::contains("Today's folder"));

    assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
}

#[test]
fn init_then_config() {
    let temp = TempDir::new().unwrap();

    rotabak(temp.path()).arg("init").assert().success();
    assert!(temp.path().join("config.json").exists());

    rotabak(temp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    rotabak(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Retention days: 7"));
}
