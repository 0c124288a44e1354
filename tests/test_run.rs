//! Full runs over word dumps written to a scratch directory.

use std::fs;
use std::path::{Path, PathBuf};

use image::GenericImageView;
use pagediff::document::to_json;
use pagediff::pipeline::REPORT_FILE;
use pagediff::{run, ComparisonJob, Document, Error, JsonLoader, Page, Region, RenderConfig, Settings, Token};
use tempfile::TempDir;

fn page(index: usize, width: f32, text: &[&str]) -> Page {
    let tokens = text
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let x = 2. + i as f32 * 12.;
            Token::new(*w, Region::new(x, 4., x + 10., 12.), index)
        })
        .collect();
    Page::new(index, width, 36., tokens)
}

fn write(dir: &Path, name: &str, pages: Vec<Page>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, to_json(&Document::new(&path, pages)).unwrap()).unwrap();
    path
}

fn settings(dpi: u32) -> Settings {
    Settings {
        render: RenderConfig::default().with_dpi(dpi),
        ..Settings::default()
    }
}

fn report(dir: &Path) -> serde_json::Value {
    let text = fs::read_to_string(dir.join(REPORT_FILE)).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_run_writes_report_and_side_by_side_pages() {
    let tmp = TempDir::new().unwrap();
    let reference = write(tmp.path(), "ref.json", vec![page(0, 72., &["The", "cat", "sat"])]);
    let candidate = write(tmp.path(), "cand.json", vec![page(0, 144., &["The", "dog", "sat"])]);
    let output_dir = tmp.path().join("comparison_results");

    let job = ComparisonJob::new(&reference, vec![candidate], &output_dir).unwrap();
    let summary = run(&job, &JsonLoader, &settings(72)).unwrap();

    assert_eq!(summary.report, output_dir.join(REPORT_FILE));
    assert_eq!(summary.compared_pages, 1);
    assert_eq!(summary.skipped_pages, 0);
    assert_eq!(summary.flagged_tokens, 1);
    assert_eq!(summary.images, vec![output_dir.join("page_0001.png")]);

    // widths add up, height is the tallest page
    let img = image::open(&summary.images[0]).unwrap();
    assert_eq!(img.dimensions(), (72 + 144, 36));

    let report = report(&output_dir);
    assert_eq!(report["compared_pages"], 1);
    assert_eq!(report["pages"][0]["status"], "compared");
    assert_eq!(report["pages"][0]["candidates"][0]["span"]["indices"][0], 1);
    assert_eq!(report["colors"].as_array().unwrap().len(), 1);
}

#[test]
fn test_run_without_rendering_writes_only_the_report() {
    let tmp = TempDir::new().unwrap();
    let reference = write(tmp.path(), "ref.json", vec![page(0, 72., &["a", "b"])]);
    let candidate = write(tmp.path(), "cand.json", vec![page(0, 72., &["a", "b"])]);
    let output_dir = tmp.path().join("out");

    let mut settings = settings(72);
    settings.render.enabled = false;
    let job = ComparisonJob::new(&reference, vec![candidate], &output_dir).unwrap();
    let summary = run(&job, &JsonLoader, &settings).unwrap();

    assert!(summary.images.is_empty());
    assert_eq!(summary.flagged_tokens, 0);
    let written: Vec<_> = fs::read_dir(&output_dir).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert_eq!(written, vec![REPORT_FILE]);
}

#[test]
fn test_run_compares_common_pages_of_every_candidate() {
    let tmp = TempDir::new().unwrap();
    let reference = write(
        tmp.path(),
        "ref.json",
        vec![page(0, 72., &["a"]), page(1, 72., &["b"]), page(2, 72., &["c"])],
    );
    let first = write(tmp.path(), "one.json", vec![page(0, 72., &["a"]), page(1, 72., &["x"])]);
    let second = write(
        tmp.path(),
        "two.json",
        vec![page(0, 72., &["y"]), page(1, 72., &["b"]), page(2, 72., &["c"])],
    );
    let output_dir = tmp.path().join("out");

    let job = ComparisonJob::new(&reference, vec![first, second], &output_dir).unwrap();
    let summary = run(&job, &JsonLoader, &settings(36)).unwrap();

    assert_eq!(summary.compared_pages, 2);
    assert_eq!(summary.flagged_tokens, 2);
    assert_eq!(summary.images.len(), 2);
    let img = image::open(output_dir.join("page_0002.png")).unwrap();
    assert_eq!(img.dimensions(), (3 * 36, 18));

    let report = report(&output_dir);
    assert_eq!(report["page_counts"], serde_json::json!([3, 2, 3]));
    assert_eq!(report["documents"].as_array().unwrap().len(), 3);
}

#[test]
fn test_run_skips_page_with_unreadable_word() {
    let tmp = TempDir::new().unwrap();
    let reference = write(
        tmp.path(),
        "ref.json",
        vec![page(0, 72., &["a", "b"]), page(1, 72., &["c", "d"])],
    );
    let candidate = tmp.path().join("cand.json");
    fs::write(
        &candidate,
        r#"{ "pages": [
            { "width": 72, "height": 36,
              "words": [ { "text": "a", "bbox": [2, 4, 12, 12] }, { "text": null, "bbox": [14, 4, 24, 12] } ] },
            { "width": 72, "height": 36,
              "words": [ { "text": "c", "bbox": [2, 4, 12, 12] }, { "text": "x", "bbox": [14, 4, 24, 12] } ] }
        ] }"#,
    )
    .unwrap();
    let output_dir = tmp.path().join("out");

    let job = ComparisonJob::new(&reference, vec![candidate], &output_dir).unwrap();
    let summary = run(&job, &JsonLoader, &settings(72)).unwrap();

    assert_eq!(summary.compared_pages, 2);
    assert_eq!(summary.skipped_pages, 1);
    assert_eq!(summary.flagged_tokens, 1);
    assert_eq!(summary.images, vec![output_dir.join("page_0002.png")]);

    let report = report(&output_dir);
    assert_eq!(report["pages"][0]["status"], "skipped");
    assert!(report["pages"][0]["reason"].as_str().unwrap().contains("no text"));
    assert_eq!(report["pages"][1]["status"], "compared");
    assert_eq!(report["pages"][1]["candidates"][0]["span"]["indices"], serde_json::json!([1]));
}

#[test]
fn test_run_reports_unreadable_document_as_load_error() {
    let tmp = TempDir::new().unwrap();
    let reference = write(tmp.path(), "ref.json", vec![page(0, 72., &["a"])]);
    let broken = tmp.path().join("broken.json");
    fs::write(&broken, "{ \"pages\": [ { \"width\": 72 ").unwrap();

    let job = ComparisonJob::new(&reference, vec![broken.clone()], tmp.path().join("out")).unwrap();
    let err = run(&job, &JsonLoader, &settings(72)).unwrap_err();
    assert_eq!(err.stage(), "load");
    assert!(matches!(err, Error::Load { ref path, .. } if *path == broken));
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn test_run_reports_unwritable_output_dir() {
    let tmp = TempDir::new().unwrap();
    let reference = write(tmp.path(), "ref.json", vec![page(0, 72., &["a"])]);
    let candidate = write(tmp.path(), "cand.json", vec![page(0, 72., &["a"])]);
    // a plain file where the output directory should go
    let output_dir = tmp.path().join("taken");
    fs::write(&output_dir, "").unwrap();

    let job = ComparisonJob::new(&reference, vec![candidate], &output_dir).unwrap();
    let err = run(&job, &JsonLoader, &settings(72)).unwrap_err();
    assert_eq!(err.stage(), "output");
    assert!(matches!(err, Error::Output { ref path, .. } if *path == output_dir));
}

#[test]
fn test_run_rejects_invalid_render_settings() {
    let tmp = TempDir::new().unwrap();
    let reference = write(tmp.path(), "ref.json", vec![page(0, 72., &["a"])]);
    let candidate = write(tmp.path(), "cand.json", vec![page(0, 72., &["a"])]);

    let mut settings = settings(72);
    settings.render.opacity = 2.;
    let job = ComparisonJob::new(&reference, vec![candidate], tmp.path().join("out")).unwrap();
    let err = run(&job, &JsonLoader, &settings).unwrap_err();
    assert_eq!(err.stage(), "config");
}

#[test]
fn test_settings_file_is_applied() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("settings.json");
    fs::write(
        &path,
        r#"{ "diff": { "suppression": "global", "normalization": { "lowercase": true } }, "render": { "dpi": 100 } }"#,
    )
    .unwrap();
    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.render.dpi, 100);
    assert!(settings.diff.normalization.lowercase);
    assert_eq!(settings.diff.suppression, pagediff::SuppressionMode::Global);
}
