//! The run loop: fetch each target's summary, write its document.
//!
//! Strictly sequential and fail-fast. Targets are processed in input
//! order, and the first fatal error aborts the run; documents already
//! written stay on disk.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::client::{ProxyClient, SummaryProvider};
use crate::config::RunConfig;
use crate::dest::{resolve_dest_root, safe_filename};
use crate::docx::write_docx;
use crate::error::{RunError, ValidationError};
use crate::targets::{read_targets, Target};

/// Progress callbacks for a run.
pub trait RunProgress {
    /// Called once after destination resolution, before the first fetch.
    fn on_run_start(&self, base_url: &str, targets_path: &Path, out_dir: &Path);

    /// Called when a target's fetch begins.
    fn on_fetch_start(&self, target: &Target, index: usize, total: usize);

    /// Called after a target's document lands on disk.
    fn on_written(&self, target: &Target, path: &Path);

    /// Called once after every target succeeded.
    fn on_run_complete(&self, written: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl RunProgress for StdoutProgress {
    fn on_run_start(&self, base_url: &str, targets_path: &Path, out_dir: &Path) {
        println!("Using base URL: {base_url}");
        println!("Reading targets: {}", targets_path.display());
        println!("Writing docs to: {}", out_dir.display());
        println!();
    }

    fn on_fetch_start(&self, target: &Target, index: usize, total: usize) {
        println!(
            "[{}/{}] Fetching {} {} ...",
            index + 1,
            total,
            target.symbol,
            target.quarter
        );
    }

    fn on_written(&self, _target: &Target, path: &Path) {
        println!("Wrote: {}", path.display());
    }

    fn on_run_complete(&self, written: usize) {
        println!("\nDone. Wrote {written} document(s).");
    }
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Paths written, in target order.
    pub documents: Vec<PathBuf>,
}

/// Drive a full run: resolve the auth key, load targets, resolve the
/// destination, then fetch and write every target in order.
pub fn run(config: &RunConfig, progress: &dyn RunProgress) -> Result<RunReport, RunError> {
    let action_key = config.action_key.resolve()?;
    let targets = read_targets(&config.targets_path)?;
    let dest_root = resolve_dest_root(config.dropbox_dir.as_deref())?;
    let out_dir = dest_root.join(&config.out_subdir);

    progress.on_run_start(&config.base_url, &config.targets_path, &out_dir);

    let client = ProxyClient::new(
        config.base_url.as_str(),
        action_key,
        config.timeout,
        config.retry,
    );
    process_targets(&targets, &client, &out_dir, progress)
}

/// The loop itself, over an already-built provider. Split out from [`run`]
/// so tests can drive it without a live endpoint.
pub fn process_targets(
    targets: &[Target],
    provider: &dyn SummaryProvider,
    out_dir: &Path,
    progress: &dyn RunProgress,
) -> Result<RunReport, RunError> {
    let total = targets.len();
    let mut documents = Vec::with_capacity(total);

    for (index, target) in targets.iter().enumerate() {
        progress.on_fetch_start(target, index, total);

        let payload = provider.fetch(target).map_err(|e| RunError::FetchExhausted {
            symbol: target.symbol.clone(),
            quarter: target.quarter.clone(),
            source: e,
        })?;

        let summary = extract_summary(target, &payload)?;

        let filename = safe_filename(&format!("{}_{}.docx", target.symbol, target.quarter));
        let out_path = out_dir.join(filename);
        let title = format!("{} — {}", target.symbol, target.quarter);

        write_docx(&out_path, &title, &summary.markdown, summary.source.as_deref()).map_err(
            |e| RunError::DocWrite {
                path: out_path.display().to_string(),
                source: e,
            },
        )?;

        progress.on_written(target, &out_path);
        documents.push(out_path);
    }

    progress.on_run_complete(documents.len());
    Ok(RunReport { documents })
}

/// Markdown body and optional source pulled out of a payload.
#[derive(Debug)]
pub struct SummaryText {
    pub markdown: String,
    pub source: Option<String>,
}

/// Require a non-empty string `markdown` field; read the optional `source`.
pub fn extract_summary(target: &Target, payload: &Value) -> Result<SummaryText, ValidationError> {
    let markdown = payload
        .get("markdown")
        .and_then(Value::as_str)
        .unwrap_or("");
    if markdown.is_empty() {
        return Err(ValidationError::EmptyMarkdown {
            symbol: target.symbol.clone(),
            quarter: target.quarter.clone(),
            payload: payload_snippet(payload),
        });
    }

    let source = payload
        .get("source")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(SummaryText {
        markdown: markdown.to_string(),
        source,
    })
}

/// First 500 characters of the serialized payload, for error messages.
fn payload_snippet(payload: &Value) -> String {
    payload.to_string().chars().take(500).collect()
}
