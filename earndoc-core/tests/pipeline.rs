//! Integration tests for the full pipeline: CSV targets through a scripted
//! provider to .docx packages on disk.
//!
//! These tests exercise the same loop the CLI drives, with the HTTP layer
//! swapped for scripted payloads.

use std::collections::VecDeque;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{json, Value};
use tempfile::tempdir;

use earndoc_core::client::SummaryProvider;
use earndoc_core::error::{FetchError, RunError, ValidationError};
use earndoc_core::run::{process_targets, RunProgress};
use earndoc_core::targets::{read_targets, Target};

struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<Value, FetchError>>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<Value, FetchError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }
}

impl SummaryProvider for ScriptedProvider {
    fn fetch(&self, _target: &Target) -> Result<Value, FetchError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("provider called more times than scripted")
    }
}

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl RunProgress for RecordingProgress {
    fn on_run_start(&self, base_url: &str, _targets_path: &Path, _out_dir: &Path) {
        self.events.lock().unwrap().push(format!("start {base_url}"));
    }

    fn on_fetch_start(&self, target: &Target, index: usize, total: usize) {
        self.events.lock().unwrap().push(format!(
            "fetch {}/{} {} {}",
            index + 1,
            total,
            target.symbol,
            target.quarter
        ));
    }

    fn on_written(&self, target: &Target, _path: &Path) {
        self.events
            .lock()
            .unwrap()
            .push(format!("wrote {}", target.symbol));
    }

    fn on_run_complete(&self, written: usize) {
        self.events.lock().unwrap().push(format!("done {written}"));
    }
}

fn payload(markdown: &str) -> Result<Value, FetchError> {
    Ok(json!({"markdown": markdown, "source": "earnings-proxy"}))
}

fn document_xml(path: &Path) -> String {
    let file = fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name("word/document.xml").unwrap();
    let mut contents = String::new();
    entry.read_to_string(&mut contents).unwrap();
    contents
}

fn write_targets_csv(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("targets.csv");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn full_run_writes_one_document_per_target_in_order() {
    let dir = tempdir().unwrap();
    let csv_path = write_targets_csv(dir.path(), "symbol,quarter\nAAPL,2024q4\nmsft,2024Q1\n");
    let out_dir = dir.path().join("Apps").join("Earnings Summaries");

    let targets = read_targets(&csv_path).unwrap();
    let provider = ScriptedProvider::new(vec![
        payload("Apple had a strong quarter."),
        payload("Microsoft grew cloud revenue."),
    ]);
    let progress = RecordingProgress::default();

    let report = process_targets(&targets, &provider, &out_dir, &progress).unwrap();

    assert_eq!(
        report.documents,
        vec![
            out_dir.join("AAPL_2024Q4.docx"),
            out_dir.join("MSFT_2024Q1.docx"),
        ]
    );
    for path in &report.documents {
        assert!(path.is_file(), "missing {}", path.display());
    }

    let first = document_xml(&report.documents[0]);
    assert!(first.contains("AAPL — 2024Q4"));
    assert!(first.contains("Apple had a strong quarter."));
    assert!(first.contains("Source: earnings-proxy"));

    assert_eq!(
        progress.events(),
        vec![
            "fetch 1/2 AAPL 2024Q4",
            "fetch 2/2 MSFT 2024Q1",
            "wrote AAPL",
            "wrote MSFT",
            "done 2",
        ]
    );
}

#[test]
fn empty_markdown_aborts_and_keeps_earlier_documents() {
    let dir = tempdir().unwrap();
    let csv_path = write_targets_csv(
        dir.path(),
        "symbol,quarter\nAAPL,2024Q4\nMSFT,2024Q4\nNVDA,2024Q4\n",
    );
    let out_dir = dir.path().join("out");

    let targets = read_targets(&csv_path).unwrap();
    // Only two replies scripted: the run must stop before the third fetch.
    let provider = ScriptedProvider::new(vec![
        payload("Apple had a strong quarter."),
        Ok(json!({"markdown": ""})),
    ]);
    let progress = RecordingProgress::default();

    let err = process_targets(&targets, &provider, &out_dir, &progress).unwrap_err();
    match err {
        RunError::Validation(ValidationError::EmptyMarkdown { symbol, quarter, .. }) => {
            assert_eq!(symbol, "MSFT");
            assert_eq!(quarter, "2024Q4");
        }
        other => panic!("expected EmptyMarkdown, got {other:?}"),
    }

    assert!(out_dir.join("AAPL_2024Q4.docx").is_file());
    assert!(!out_dir.join("MSFT_2024Q4.docx").exists());
    assert!(!out_dir.join("NVDA_2024Q4.docx").exists());

    let events = progress.events();
    assert!(events.contains(&"fetch 2/3 MSFT 2024Q4".to_string()));
    assert!(!events.iter().any(|e| e.starts_with("fetch 3/3")));
    assert!(!events.iter().any(|e| e.starts_with("done")));
}

#[test]
fn exhausted_fetch_aborts_the_run() {
    let dir = tempdir().unwrap();
    let csv_path = write_targets_csv(dir.path(), "symbol,quarter\nZZZZ,2024Q4\nAAPL,2024Q4\n");
    let out_dir = dir.path().join("out");

    let targets = read_targets(&csv_path).unwrap();
    let provider = ScriptedProvider::new(vec![Err(FetchError::Status {
        status: 404,
        body: "no summary".to_string(),
    })]);
    let progress = RecordingProgress::default();

    let err = process_targets(&targets, &provider, &out_dir, &progress).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("ZZZZ 2024Q4"));
    assert!(msg.contains("HTTP 404"));
    assert!(!out_dir.exists());
}

#[test]
fn rerun_overwrites_existing_documents() {
    let dir = tempdir().unwrap();
    let csv_path = write_targets_csv(dir.path(), "symbol,quarter\nAAPL,2024Q4\n");
    let out_dir = dir.path().join("out");
    let targets = read_targets(&csv_path).unwrap();
    let progress = RecordingProgress::default();

    let provider = ScriptedProvider::new(vec![payload("first draft")]);
    process_targets(&targets, &provider, &out_dir, &progress).unwrap();

    let provider = ScriptedProvider::new(vec![payload("final version")]);
    process_targets(&targets, &provider, &out_dir, &progress).unwrap();

    let doc = document_xml(&out_dir.join("AAPL_2024Q4.docx"));
    assert!(doc.contains("final version"));
    assert!(!doc.contains("first draft"));
}

#[test]
fn unsafe_symbol_characters_are_sanitized_in_filenames() {
    let dir = tempdir().unwrap();
    let csv_path = write_targets_csv(dir.path(), "symbol,quarter\nbrk/b,2024Q4\n");
    let out_dir = dir.path().join("out");

    let targets = read_targets(&csv_path).unwrap();
    assert_eq!(targets[0].symbol, "BRK/B");

    let provider = ScriptedProvider::new(vec![payload("Berkshire summary.")]);
    let progress = RecordingProgress::default();
    let report = process_targets(&targets, &provider, &out_dir, &progress).unwrap();

    assert_eq!(report.documents, vec![out_dir.join("BRK-B_2024Q4.docx")]);
    assert!(report.documents[0].is_file());
}

#[test]
fn loader_failure_happens_before_any_fetch() {
    let dir = tempdir().unwrap();
    let csv_path = write_targets_csv(dir.path(), "symbol,quarter\nAAPL,2024Q9\n");

    // Loading fails on the malformed quarter, so no provider is consulted.
    let err = read_targets(&csv_path).unwrap_err();
    assert!(err.to_string().contains("2024Q9"));
}
