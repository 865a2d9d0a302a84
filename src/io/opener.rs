use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::config::AppConfig;

const FALLBACK_EDITOR: &str = "vim";

#[cfg(target_os = "macos")]
const PLATFORM_DIR_OPENER: &str = "open";
#[cfg(target_os = "windows")]
const PLATFORM_DIR_OPENER: &str = "explorer";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const PLATFORM_DIR_OPENER: &str = "xdg-open";

/// Configured file opener, then `$EDITOR`, then `vim`.
pub fn pick_file_opener(config: &AppConfig, editor_env: Option<&str>) -> String {
    [Some(config.file_opener.as_str()), editor_env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(FALLBACK_EDITOR)
        .to_string()
}

pub fn pick_dir_opener(config: &AppConfig) -> String {
    match config.dir_opener.trim() {
        "" => PLATFORM_DIR_OPENER.to_string(),
        opener => opener.to_string(),
    }
}

/// Runs `opener` with `target` appended. Openers may carry arguments, e.g. `code -w`.
pub fn run_open(opener: &str, target: &Path) -> Result<()> {
    let mut parts = opener.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("invalid opener command");
    };

    let resolved = which::which(program)
        .with_context(|| format!("could not find opener '{program}' in PATH"))?;
    debug!(program = %resolved.display(), target = %target.display(), "running opener");

    let status = Command::new(&resolved)
        .args(parts)
        .arg(target)
        .status()
        .with_context(|| format!("failed to run opener '{program}'"))?;
    if !status.success() {
        bail!("opener '{program}' exited with {status}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{pick_dir_opener, pick_file_opener, run_open, PLATFORM_DIR_OPENER};
    use crate::config::AppConfig;
    use std::path::Path;

    fn config_with_openers(file_opener: &str, dir_opener: &str) -> AppConfig {
        AppConfig {
            file_opener: file_opener.to_string(),
            dir_opener: dir_opener.to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn file_opener_prefers_config_then_editor_then_vim() {
        let cfg = config_with_openers("  code -w ", "");
        assert_eq!(pick_file_opener(&cfg, Some("nano")), "code -w");

        let cfg = config_with_openers("   ", "");
        assert_eq!(pick_file_opener(&cfg, Some(" nano ")), "nano");
        assert_eq!(pick_file_opener(&cfg, Some("")), "vim");
        assert_eq!(pick_file_opener(&cfg, None), "vim");
    }

    #[test]
    fn dir_opener_falls_back_to_platform_default() {
        assert_eq!(pick_dir_opener(&config_with_openers("", "")), PLATFORM_DIR_OPENER);
        assert_eq!(
            pick_dir_opener(&config_with_openers("", " nautilus ")),
            "nautilus"
        );
    }

    #[test]
    fn run_open_rejects_blank_opener() {
        let err = run_open("   ", Path::new("/tmp")).expect_err("blank opener should fail");
        assert!(err.to_string().contains("invalid opener command"));
    }

    #[test]
    fn run_open_reports_missing_program() {
        let err = run_open("cliesp-definitely-missing-opener --flag", Path::new("/tmp"))
            .expect_err("unknown program should fail");
        assert!(err
            .to_string()
            .contains("could not find opener 'cliesp-definitely-missing-opener' in PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn run_open_passes_arguments_and_target() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let target = tmp.path().join("opened.yml");

        run_open("touch", &target).expect("touch should succeed");
        assert!(target.exists());

        let err = run_open("false", &target).expect_err("failing opener should error");
        assert!(err.to_string().contains("exited with"));
    }
}
