// src/pipeline.rs
//! Per-container cleaning pipeline
//!
//! Each input moves strictly forward through
//!
//! ```text
//! Opened → Validated → Decrypted → Filtered → Reencrypted → Written
//! ```
//!
//! and any failure aborts that one file only. The input is opened read-only
//! and the result always goes to a new `<stem>_cleaned.arcx` beside it.
//! Derived keys and plaintext are dropped (and zeroized) as soon as the stage
//! that needs them is done.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::aliases::ArcxPassword;
use crate::consts::{
    CLEANED_SUFFIX, CONTAINER_EXTENSION, DEFAULT_MIN_ASSISTANT_MESSAGES, KDF_ITERATIONS,
    MIN_CIPHERTEXT_LEN,
};
use crate::container::ArchiveContainer;
use crate::crypto::{decrypt_to_vec, derive_key, encrypt_to_vec, generate_salt};
use crate::error::CoreError;
use crate::filter::ChatFilter;
use crate::payload::PayloadArchive;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    pub min_assistant_messages: usize,
    pub kdf_iterations: u32,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            min_assistant_messages: DEFAULT_MIN_ASSISTANT_MESSAGES,
            kdf_iterations: KDF_ITERATIONS,
        }
    }
}

/// Pipeline states, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Opened,
    Validated,
    Decrypted,
    Filtered,
    Reencrypted,
    Written,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Opened => "open",
            Stage::Validated => "validate",
            Stage::Decrypted => "decrypt",
            Stage::Filtered => "filter",
            Stage::Reencrypted => "re-encrypt",
            Stage::Written => "write",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy)]
pub enum Mode<'a> {
    /// Report the would-be output path; no crypto, no writes.
    DryRun,
    Clean { password: &'a ArcxPassword },
}

impl Mode<'_> {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Mode::DryRun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub removed: usize,
    pub kept_chats: usize,
    pub malformed: usize,
}

/// A rebuilt container, not yet written anywhere
#[derive(Debug)]
pub struct CleanedContainer {
    pub container: ArchiveContainer,
    pub removed: usize,
    pub kept_chats: usize,
    pub malformed: usize,
}

#[derive(Debug)]
pub enum FileOutcome {
    Cleaned(CleanReport),
    DryRun {
        input: PathBuf,
        output: PathBuf,
    },
    /// `stage` is the step that failed.
    Skipped {
        input: PathBuf,
        stage: Stage,
        error: CoreError,
    },
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, FileOutcome::Skipped { .. })
    }

    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Cleaned(report) => &report.input,
            FileOutcome::DryRun { input, .. } | FileOutcome::Skipped { input, .. } => input,
        }
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Cleaned(report) => {
                write!(
                    f,
                    "OK: {} -> {}  (removed {} short chats, kept {})",
                    display_name(&report.input),
                    display_name(&report.output),
                    report.removed,
                    report.kept_chats
                )?;
                if report.malformed > 0 {
                    write!(f, " [{} unreadable chats kept as-is]", report.malformed)?;
                }
                Ok(())
            }
            FileOutcome::DryRun { input, output } => write!(
                f,
                "[DRY RUN] Would process: {} -> {}",
                input.display(),
                output.display()
            ),
            FileOutcome::Skipped { input, error, .. } => {
                write!(f, "Skip ({error}): {}", input.display())
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
    pub dry_run: bool,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// A real run fails only when not a single file made it through
    pub fn exit_ok(&self) -> bool {
        self.dry_run || self.succeeded() > 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Done: {} file(s) processed.", self.succeeded())
    }
}

/// `dir/name.arcx` → `dir/name_cleaned.arcx`
pub fn cleaned_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{CLEANED_SUFFIX}.{CONTAINER_EXTENSION}"))
}

/// Case-insensitive `.arcx` check
pub fn has_container_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(CONTAINER_EXTENSION))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cleaner {
    filter: ChatFilter,
    kdf_iterations: u32,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(CleanOptions::default())
    }
}

impl Cleaner {
    pub fn new(options: CleanOptions) -> Self {
        Self {
            filter: ChatFilter::new(options.min_assistant_messages),
            kdf_iterations: options.kdf_iterations,
        }
    }

    /// Run every input independently; one failure never stops the batch
    pub fn clean_batch<I, P>(&self, inputs: I, mode: Mode<'_>) -> BatchSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.clean_batch_with(inputs, mode, |_| {})
    }

    /// Like [`Cleaner::clean_batch`], calling `on_outcome` as each file finishes
    pub fn clean_batch_with<I, P, F>(
        &self,
        inputs: I,
        mode: Mode<'_>,
        mut on_outcome: F,
    ) -> BatchSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
        F: FnMut(&FileOutcome),
    {
        let mut outcomes = Vec::new();
        for input in inputs {
            let outcome = self.clean_file(input.as_ref(), mode);
            on_outcome(&outcome);
            outcomes.push(outcome);
        }
        BatchSummary {
            outcomes,
            dry_run: mode.is_dry_run(),
        }
    }

    pub fn clean_file(&self, input: &Path, mode: Mode<'_>) -> FileOutcome {
        let output = cleaned_output_path(input);
        let mut stage = Stage::Opened;

        match self.process(input, &output, mode, &mut stage) {
            Ok(Some(report)) => {
                info!(
                    input = %input.display(),
                    removed = report.removed,
                    kept = report.kept_chats,
                    "container cleaned"
                );
                if report.malformed > 0 {
                    warn!(
                        input = %input.display(),
                        malformed = report.malformed,
                        "unreadable chat records passed through"
                    );
                }
                FileOutcome::Cleaned(report)
            }
            Ok(None) => FileOutcome::DryRun {
                input: input.to_path_buf(),
                output,
            },
            Err(error) => {
                warn!(input = %input.display(), %stage, %error, "skipping container");
                FileOutcome::Skipped {
                    input: input.to_path_buf(),
                    stage,
                    error,
                }
            }
        }
    }

    fn process(
        &self,
        input: &Path,
        output: &Path,
        mode: Mode<'_>,
        stage: &mut Stage,
    ) -> Result<Option<CleanReport>> {
        if !input.is_file() {
            return Err(CoreError::InvalidContainer("not a file".into()));
        }
        if !has_container_extension(input) {
            return Err(CoreError::InvalidContainer(format!(
                "not .{CONTAINER_EXTENSION}"
            )));
        }

        let password = match mode {
            Mode::DryRun => return Ok(None),
            Mode::Clean { password } => password,
        };

        let container = ArchiveContainer::read_from(input)?;
        let cleaned = self.transform(container, password, stage)?;

        *stage = Stage::Written;
        cleaned.container.write_to(output)?;
        debug!(output = %output.display(), "container written");

        Ok(Some(CleanReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            removed: cleaned.removed,
            kept_chats: cleaned.kept_chats,
            malformed: cleaned.malformed,
        }))
    }

    /// Validate → decrypt → filter → re-encrypt, entirely in memory
    pub fn clean_container(
        &self,
        container: ArchiveContainer,
        password: &ArcxPassword,
    ) -> Result<CleanedContainer> {
        let mut stage = Stage::Opened;
        self.transform(container, password, &mut stage)
    }

    fn transform(
        &self,
        container: ArchiveContainer,
        password: &ArcxPassword,
        stage: &mut Stage,
    ) -> Result<CleanedContainer> {
        let password = password.expose_secret().as_bytes();

        *stage = Stage::Validated;
        let old_salt = container.manifest.require_password_salt()?;
        // Reject before paying for key derivation
        if container.ciphertext.len() < MIN_CIPHERTEXT_LEN {
            return Err(CoreError::MalformedCiphertext {
                len: container.ciphertext.len(),
            });
        }

        *stage = Stage::Decrypted;
        let plaintext = {
            let key = derive_key(password, &old_salt, self.kdf_iterations)?;
            decrypt_to_vec(&container.ciphertext, &key)?
        };

        *stage = Stage::Filtered;
        let rebuilt = {
            let payload = PayloadArchive::open(plaintext.expose_secret())?;
            drop(plaintext);
            payload.rebuild(|entry| self.filter.evaluate(entry.data()))?
        };
        debug!(
            removed = rebuilt.removed,
            kept = rebuilt.kept_chats,
            "payload rebuilt"
        );

        *stage = Stage::Reencrypted;
        let mut new_salt = generate_salt();
        while new_salt == old_salt {
            new_salt = generate_salt();
        }
        let ciphertext = {
            let key = derive_key(password, &new_salt, self.kdf_iterations)?;
            encrypt_to_vec(rebuilt.payload.expose_secret(), &key)?
        };

        let manifest =
            container
                .manifest
                .sync_after_rebuild(&new_salt, rebuilt.kept_chats, &ciphertext);

        Ok(CleanedContainer {
            container: ArchiveContainer::new(manifest, ciphertext),
            removed: rebuilt.removed,
            kept_chats: rebuilt.kept_chats,
            malformed: rebuilt.malformed,
        })
    }
}
