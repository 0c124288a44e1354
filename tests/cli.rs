//! Command line behaviour of the `pagediff` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use pagediff::document::to_json;
use pagediff::pipeline::REPORT_FILE;
use pagediff::{Document, Page, Region, Token};
use predicates::prelude::*;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pagediff"))
}

fn write_doc(dir: &Path, name: &str, words: &[&str]) -> PathBuf {
    let tokens = words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let x = 2. + i as f32 * 12.;
            Token::new(*w, Region::new(x, 4., x + 10., 12.), 0)
        })
        .collect();
    let path = dir.join(name);
    let document = Document::new(&path, vec![Page::new(0, 72., 36., tokens)]);
    fs::write(&path, to_json(&document).unwrap()).unwrap();
    path
}

fn flagged(output_dir: &Path) -> serde_json::Value {
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output_dir.join(REPORT_FILE)).unwrap()).unwrap();
    report["pages"][0]["candidates"][0]["span"]["indices"].clone()
}

#[test]
fn test_compare_writes_report_and_exits_zero() {
    let tmp = TempDir::new().unwrap();
    let reference = write_doc(tmp.path(), "ref.json", &["The", "cat", "sat"]);
    let candidate = write_doc(tmp.path(), "cand.json", &["The", "dog", "sat"]);
    let output_dir = tmp.path().join("out");

    cli()
        .arg(&reference)
        .arg(&candidate)
        .arg("-o")
        .arg(&output_dir)
        .arg("--dpi")
        .arg("72")
        .assert()
        .success()
        .stdout(predicate::str::contains("Comparison complete"))
        .stdout(predicate::str::contains(REPORT_FILE));

    assert!(output_dir.join(REPORT_FILE).exists());
    assert!(output_dir.join("page_0001.png").exists());
    assert_eq!(flagged(&output_dir), serde_json::json!([1]));
}

#[test]
fn test_broken_candidate_fails_with_load_stage() {
    let tmp = TempDir::new().unwrap();
    let reference = write_doc(tmp.path(), "ref.json", &["a"]);
    let broken = tmp.path().join("broken.json");
    fs::write(&broken, "not json").unwrap();

    cli()
        .arg(&reference)
        .arg(&broken)
        .arg("-o")
        .arg(tmp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("[load]"))
        .stderr(predicate::str::contains("broken.json"));
}

#[test]
fn test_missing_candidate_argument_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let reference = write_doc(tmp.path(), "ref.json", &["a"]);
    cli().arg(&reference).assert().failure();
}

#[test]
fn test_flag_overrides_settings_file() {
    let tmp = TempDir::new().unwrap();
    let reference = write_doc(tmp.path(), "ref.json", &["total", "due", "now", "paid"]);
    let candidate = write_doc(tmp.path(), "cand.json", &["paid", "total", "due", "now"]);
    let settings = tmp.path().join("settings.json");
    fs::write(&settings, r#"{ "diff": { "suppression": "windowed" } }"#).unwrap();

    let from_file = tmp.path().join("from_file");
    cli()
        .arg(&reference)
        .arg(&candidate)
        .arg("-o")
        .arg(&from_file)
        .arg("--config")
        .arg(&settings)
        .arg("--no-render")
        .assert()
        .success();
    assert_eq!(flagged(&from_file), serde_json::json!([0]));

    let overridden = tmp.path().join("overridden");
    cli()
        .arg(&reference)
        .arg(&candidate)
        .arg("-o")
        .arg(&overridden)
        .arg("--config")
        .arg(&settings)
        .arg("--suppression")
        .arg("global")
        .arg("--no-render")
        .assert()
        .success();
    assert_eq!(flagged(&overridden), serde_json::json!([]));
}

#[test]
fn test_flag_can_turn_off_a_settings_file_option() {
    let tmp = TempDir::new().unwrap();
    let reference = write_doc(tmp.path(), "ref.json", &["The", "Cat"]);
    let candidate = write_doc(tmp.path(), "cand.json", &["The", "cat"]);
    let settings = tmp.path().join("settings.json");
    fs::write(&settings, r#"{ "diff": { "normalization": { "lowercase": true } } }"#).unwrap();

    let folded = tmp.path().join("folded");
    cli()
        .arg(&reference)
        .arg(&candidate)
        .arg("-o")
        .arg(&folded)
        .arg("--config")
        .arg(&settings)
        .arg("--no-render")
        .assert()
        .success();
    assert_eq!(flagged(&folded), serde_json::json!([]));

    let exact = tmp.path().join("exact");
    cli()
        .arg(&reference)
        .arg(&candidate)
        .arg("-o")
        .arg(&exact)
        .arg("--config")
        .arg(&settings)
        .arg("--lowercase=false")
        .arg("--no-render")
        .assert()
        .success();
    assert_eq!(flagged(&exact), serde_json::json!([1]));
}

#[test]
fn test_invalid_dpi_fails_with_config_stage() {
    let tmp = TempDir::new().unwrap();
    let reference = write_doc(tmp.path(), "ref.json", &["a"]);
    let candidate = write_doc(tmp.path(), "cand.json", &["a"]);
    cli()
        .arg(&reference)
        .arg(&candidate)
        .arg("-o")
        .arg(tmp.path().join("out"))
        .arg("--dpi")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("[config]"));
}
