//! Generate one .docx per company quarter from the earnings proxy.
//!
//! Reads targets from a CSV with symbol,quarter columns, calls `/summary`
//! with an x-action-key header, and writes each summary into a local
//! Dropbox folder. Sync to other machines is the Dropbox client's job.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use earndoc_core::config::{ActionKey, RunConfig, DEFAULT_BASE_URL, DEFAULT_OUT_SUBDIR};
use earndoc_core::run::{run, StdoutProgress};

#[derive(Parser)]
#[command(
    name = "earndoc",
    about = "Generate earnings summary .docx files into Dropbox"
)]
struct Cli {
    /// Path to a CSV with symbol,quarter columns.
    #[arg(long, default_value = "targets.csv")]
    targets: PathBuf,

    /// Base URL of the earnings proxy.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Auth key value. Mutually exclusive with --action-key-env.
    #[arg(long)]
    action_key: Option<String>,

    /// Name of an env var holding the auth key (recommended).
    #[arg(long)]
    action_key_env: Option<String>,

    /// Dropbox folder. Falls back to DROPBOX_DIR, then ~/Dropbox.
    #[arg(long)]
    dropbox_dir: Option<PathBuf>,

    /// Subfolder under the Dropbox root to write documents into.
    #[arg(long, default_value = DEFAULT_OUT_SUBDIR)]
    out_subdir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let action_key = match (cli.action_key, cli.action_key_env) {
        (Some(_), Some(_)) => bail!("--action-key and --action-key-env are mutually exclusive"),
        (None, None) => bail!("one of --action-key or --action-key-env is required"),
        (Some(value), None) => ActionKey::Value(value),
        (None, Some(name)) => ActionKey::FromEnv(name),
    };

    let mut config = RunConfig::new(cli.targets, action_key);
    config.base_url = cli.base_url;
    config.dropbox_dir = cli.dropbox_dir;
    config.out_subdir = cli.out_subdir;

    if let Err(e) = run(&config, &StdoutProgress) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
    Ok(())
}
