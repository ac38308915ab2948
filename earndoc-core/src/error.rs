//! Error taxonomy for a generation run.
//!
//! Failures fall into three kinds that behave differently:
//! - [`ConfigError`]: bad or missing inputs (files, paths, env vars), fatal
//!   before any network traffic.
//! - [`ValidationError`]: malformed targets or payloads, fatal for the run.
//! - [`FetchError`]: one transient HTTP failure, retried with backoff and
//!   escalated only once the retry budget is spent.
//!
//! Every fatal path funnels into [`RunError`], which the CLI prints to
//! stderr and maps to exit status 1.

use thiserror::Error;

use crate::docx::DocxError;

/// Bad or missing configuration. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("targets file not found: {0}")]
    TargetsFileMissing(String),

    #[error("could not read targets file {path}: {reason}")]
    TargetsFileUnreadable { path: String, reason: String },

    #[error("targets file is missing a header row (expected symbol,quarter)")]
    MissingHeader,

    #[error("targets file must have symbol and quarter columns (got {0:?})")]
    MissingColumns(Vec<String>),

    #[error("no targets found in targets file")]
    NoTargets,

    #[error("Dropbox dir does not exist: {0}")]
    DestinationMissing(String),

    #[error("could not locate a Dropbox folder; pass --dropbox-dir or set {0}")]
    DestinationUnresolved(&'static str),

    #[error("env var {0} is not set")]
    ActionKeyEnvUnset(String),
}

/// Input or payload validation failure. Aborts the entire run.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("quarter must look like 2024Q4 (got '{0}')")]
    BadQuarter(String),

    #[error("no usable 'markdown' field for {symbol} {quarter}: {payload}")]
    EmptyMarkdown {
        symbol: String,
        quarter: String,
        /// Leading slice of the offending payload, for diagnostics.
        payload: String,
    },
}

/// A single transient failure while fetching one summary.
///
/// Every variant is retryable; there is no permanent-failure classification.
/// A 404 burns the full retry budget exactly like a 503.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid JSON in response body: {0}")]
    Decode(String),
}

/// Errors surfaced by the targets loader.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Top-level error for a run. All fatal paths funnel here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to fetch summary for {symbol} {quarter}: {source}")]
    FetchExhausted {
        symbol: String,
        quarter: String,
        source: FetchError,
    },

    #[error("failed to write {path}: {source}")]
    DocWrite { path: String, source: DocxError },
}
