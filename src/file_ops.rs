// src/file_ops.rs
//! Input discovery for the batch binary
//!
//! Plain file arguments are passed through untouched (the pipeline reports
//! anything that is not a container). Directory arguments expand to every
//! `.arcx` file beneath them, minus earlier `_cleaned` outputs.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::consts::CLEANED_SUFFIX;
use crate::pipeline::has_container_extension;

pub fn expand_inputs<I, P>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut inputs = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            inputs.push(path.to_path_buf());
            continue;
        }

        for entry in WalkDir::new(path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(%err, "cannot read directory entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
        {
            let found = entry.path();
            if has_container_extension(found) && !is_cleaned_output(found) {
                inputs.push(found.to_path_buf());
            }
        }
    }
    inputs
}

/// True for files this tool produced on an earlier run
pub fn is_cleaned_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem.ends_with(CLEANED_SUFFIX))
        .unwrap_or(false)
}
