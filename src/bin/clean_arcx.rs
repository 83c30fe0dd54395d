// src/bin/clean_arcx.rs
//! Batch ARCX cleaner: drop chat sessions with too few assistant replies
//!
//! Writes `<name>_cleaned.arcx` next to every input; inputs are never modified.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use arcx_clean::aliases::ArcxPassword;
use arcx_clean::consts::{CONFIG_ENV, PASSWORD_ENV};
use arcx_clean::file_ops::expand_inputs;
use arcx_clean::{load_config, Cleaner, Mode};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "clean_arcx",
    version,
    about = "Drop chat sessions with too few assistant replies from password-encrypted ARCX files"
)]
struct Cli {
    /// Paths to .arcx files (directories are searched recursively)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Minimum assistant messages to keep a chat (default: 3, or the config value)
    #[arg(long)]
    min_responses: Option<usize>,

    /// Archive password; prompted once if not given
    #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
    password: Option<String>,

    /// Only print what would be done
    #[arg(long)]
    dry_run: bool,

    /// Path to an arcx-clean.toml configuration file
    #[arg(long, short = 'c', env = CONFIG_ENV)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let mut options = config.clean_options();
    if let Some(min) = cli.min_responses {
        options.min_assistant_messages = min;
    }

    // Obtained once, before any file is touched
    let password = resolve_password(cli.password, cli.dry_run)?;
    let mode = match password.as_ref() {
        Some(password) => Mode::Clean { password },
        None => Mode::DryRun,
    };

    let inputs = expand_inputs(&cli.files);
    info!(
        files = inputs.len(),
        min_responses = options.min_assistant_messages,
        dry_run = cli.dry_run,
        "starting batch"
    );

    let cleaner = Cleaner::new(options);
    let summary = cleaner.clean_batch_with(&inputs, mode, |outcome| println!("{outcome}"));

    println!("{summary}");
    Ok(if summary.exit_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn resolve_password(given: Option<String>, dry_run: bool) -> Result<Option<ArcxPassword>> {
    if dry_run {
        return Ok(None);
    }

    let password = match given.filter(|p| !p.is_empty()) {
        Some(p) => p,
        None => rpassword::prompt_password("ARCX password: ").context("Failed to read password")?,
    };
    if password.is_empty() {
        bail!("Password required.");
    }
    Ok(Some(ArcxPassword::new(password)))
}
