use std::path::{is_separator, Path, PathBuf};

use tracing::debug;

use crate::config::AppConfig;
use crate::core::error::MatchError;

#[cfg(target_os = "macos")]
pub const DEFAULT_MATCH_DIR: &str = "~/Library/Application Support/espanso/match";
#[cfg(target_os = "windows")]
pub const DEFAULT_MATCH_DIR: &str = "~/AppData/Roaming/espanso/match";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const DEFAULT_MATCH_DIR: &str = "~/.config/espanso/match";

pub const DEFAULT_MATCH_FILE: &str = "cliesp.yml";

/// Resolves the match file path.
///
/// An explicit path wins over the configured directory. It is treated as a
/// directory when it ends with a separator or its last segment has no
/// extension, in which case the configured (or default) file name is joined
/// onto it. Otherwise it is taken as the full file path.
pub fn resolve_match_path(explicit: &str, config: &AppConfig) -> Result<PathBuf, MatchError> {
    resolve_match_path_with(explicit, config, dirs::home_dir)
}

/// Expands a leading `~` or `~/` to the home directory. Other paths are
/// returned unchanged, including `~user` forms.
pub fn expand_home(path: &str) -> Result<PathBuf, MatchError> {
    expand_home_with(path, &dirs::home_dir)
}

fn resolve_match_path_with<F>(
    explicit: &str,
    config: &AppConfig,
    home: F,
) -> Result<PathBuf, MatchError>
where
    F: Fn() -> Option<PathBuf>,
{
    let dir = non_empty_or(&config.match_dir, DEFAULT_MATCH_DIR);
    let file = non_empty_or(&config.match_file, DEFAULT_MATCH_FILE);

    if !explicit.is_empty() {
        let expanded = expand_home_with(explicit, &home)?;
        let resolved = if explicit.ends_with(is_separator) || !has_extension(&expanded) {
            expanded.join(file)
        } else {
            expanded
        };
        debug!(explicit, path = %resolved.display(), "resolved match path from explicit path");
        return Ok(resolved);
    }

    let resolved = expand_home_with(dir, &home)?.join(file);
    debug!(dir, file, path = %resolved.display(), "resolved match path from config");
    Ok(resolved)
}

fn expand_home_with<F>(path: &str, home: &F) -> Result<PathBuf, MatchError>
where
    F: Fn() -> Option<PathBuf>,
{
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(PathBuf::from(path));
    };

    if rest.is_empty() {
        return home().ok_or(MatchError::HomeDirUnavailable);
    }

    if rest.starts_with(is_separator) {
        let home = home().ok_or(MatchError::HomeDirUnavailable)?;
        return Ok(home.join(rest.trim_start_matches(is_separator)));
    }

    Ok(PathBuf::from(path))
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// True when the final path segment has a `.` followed by at least one character.
fn has_extension(path: &Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    let last = raw.rsplit(is_separator).next().unwrap_or_default();
    match last.rfind('.') {
        Some(index) => index + 1 < last.len(),
        None => false,
    }
}
