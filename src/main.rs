mod cli;
mod config;
mod core;
mod io;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::{AppConfig, ConfigLoader};
use crate::core::match_file::{append_entry, ensure_file_with_header};
use crate::core::paths::resolve_match_path;
use crate::core::snippet::build_yaml_snippet;
use crate::io::opener::{pick_dir_opener, pick_file_opener, run_open};
use crate::io::prompt::{Prompter, REPLACE_PROMPT};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("cliesp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(dir) = cli.config {
        loader = loader.with_config_dir(dir);
    }
    let loaded = loader.load().context("error loading config")?;
    if let Some(path) = &loaded.settings_path {
        info!(path = %path.display(), "loaded settings file");
    }
    let config = loaded.config;
    config.validate().context("error loading config")?;

    let explicit = cli.match_file.as_deref().unwrap_or_default();
    let file_path =
        resolve_match_path(explicit, &config).context("error resolving match file path")?;
    ensure_file_with_header(&file_path).context("error preparing file")?;

    if cli.open || cli.open_dir {
        return open_target(&config, &file_path, cli.open_dir);
    }

    let stdin = std::io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
    let triggers = prompter.read_triggers()?;
    let replace = prompter
        .read_multiline(REPLACE_PROMPT, config.multiline_mode())
        .context("error reading replace string")?;
    if replace.is_empty() {
        warn!("replacement text is empty");
    }

    let entry = build_yaml_snippet(&triggers, &replace);
    append_entry(&file_path, &entry)?;
    println!(
        "Appended {} trigger(s) to {}",
        triggers.len(),
        file_path.display()
    );

    Ok(())
}

fn open_target(config: &AppConfig, file_path: &Path, open_dir: bool) -> Result<()> {
    let (opener, target) = if open_dir {
        let dir = file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        (pick_dir_opener(config), dir)
    } else {
        let editor = std::env::var("EDITOR").ok();
        (pick_file_opener(config, editor.as_deref()), file_path)
    };

    run_open(&opener, target).context("failed to open")?;
    println!("Opened {}", target.display());
    Ok(())
}
