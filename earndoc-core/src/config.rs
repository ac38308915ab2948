//! Run configuration, assembled at the CLI boundary.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::{RetryPolicy, DEFAULT_TIMEOUT};
use crate::error::ConfigError;

/// Default endpoint for the earnings proxy.
pub const DEFAULT_BASE_URL: &str = "https://earnings-proxy.onrender.com";

/// Default subfolder, relative to the destination root, that documents
/// land in.
pub const DEFAULT_OUT_SUBDIR: &str = "Apps/Earnings Summaries";

/// Where the auth key comes from: a literal value or a named env var.
///
/// The env var form keeps the key out of shell history; it is read once,
/// at the start of a run.
#[derive(Debug, Clone)]
pub enum ActionKey {
    Value(String),
    FromEnv(String),
}

impl ActionKey {
    /// Produce the key, reading the environment when needed. An unset or
    /// empty env var is a configuration error.
    pub fn resolve(&self) -> Result<String, ConfigError> {
        match self {
            ActionKey::Value(key) => Ok(key.clone()),
            ActionKey::FromEnv(name) => match env::var(name) {
                Ok(value) if !value.is_empty() => Ok(value),
                _ => Err(ConfigError::ActionKeyEnvUnset(name.clone())),
            },
        }
    }
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub targets_path: PathBuf,
    pub base_url: String,
    pub action_key: ActionKey,
    /// Explicit destination root; when `None`, the env var and home-dir
    /// fallbacks apply.
    pub dropbox_dir: Option<PathBuf>,
    pub out_subdir: PathBuf,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl RunConfig {
    /// Config with the default endpoint, subfolder, timeout, and retry
    /// budget.
    pub fn new(targets_path: impl Into<PathBuf>, action_key: ActionKey) -> Self {
        Self {
            targets_path: targets_path.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            action_key,
            dropbox_dir: None,
            out_subdir: PathBuf::from(DEFAULT_OUT_SUBDIR),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}
