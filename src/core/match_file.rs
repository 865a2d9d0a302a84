use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Header written to newly created match files. `matches:` is the root key
/// appended entries attach to.
pub const MATCH_FILE_HEADER: &str = "# espanso match file (managed by cliesp)

# This file is generated and maintained by cliesp. Entries are appended, existing content is never rewritten.

# For information about espanso, visit the official docs at: https://espanso.org/docs/

matches:
";

/// Creates `path` (and its parent directories) with [`MATCH_FILE_HEADER`] if
/// it does not exist yet. Returns `true` when the file was created.
pub fn ensure_file_with_header(path: &Path) -> Result<bool> {
    if path.exists() {
        debug!(path = %path.display(), "match file already exists");
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create match directory: {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("failed to create match file: {}", path.display()))?;
    file.write_all(MATCH_FILE_HEADER.as_bytes())
        .with_context(|| format!("failed to write match file header: {}", path.display()))?;

    info!(path = %path.display(), "created match file");
    Ok(true)
}

/// Appends a rendered entry to an existing match file.
pub fn append_entry(path: &Path, entry: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open match file for append: {}", path.display()))?;
    file.write_all(entry.as_bytes())
        .with_context(|| format!("failed to write entry: {}", path.display()))?;

    debug!(path = %path.display(), bytes = entry.len(), "appended match entry");
    Ok(())
}
