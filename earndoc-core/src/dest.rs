//! Destination resolution: where generated documents land.
//!
//! The root is resolved in order, first hit wins:
//! 1. an explicit `--dropbox-dir` path, which must exist,
//! 2. the `DROPBOX_DIR` env var, if set and pointing at an existing path,
//! 3. `{home}/Dropbox`, if it exists.
//!
//! The resolved root joined with a relative subpath gives the write
//! directory; the document writer creates it on first write.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Env var naming a fallback destination root.
pub const DEST_ENV_VAR: &str = "DROPBOX_DIR";

/// Resolve the destination root from the explicit override, the
/// environment, or the conventional home-dir location.
pub fn resolve_dest_root(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    resolve_from(explicit, std::env::var_os(DEST_ENV_VAR), dirs::home_dir())
}

/// Resolution over plain values so tests can drive every branch.
fn resolve_from(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::DestinationMissing(path.display().to_string()));
        }
        return Ok(path.to_path_buf());
    }

    if let Some(value) = env_value {
        let path = PathBuf::from(value);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Some(home) = home {
        let path = home.join("Dropbox");
        if path.exists() {
            return Ok(path);
        }
    }

    Err(ConfigError::DestinationUnresolved(DEST_ENV_VAR))
}

/// Replace filesystem-unsafe characters with `-` and collapse whitespace.
///
/// Covers the Windows-illegal set `< > : " / \ | ? *` plus control
/// characters; runs of whitespace shrink to a single interior space and
/// leading/trailing whitespace is dropped.
pub fn safe_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            if !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
        }
        match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => out.push('-'),
            c if c.is_control() => out.push('-'),
            c => out.push(c),
        }
    }
    out
}
