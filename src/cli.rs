use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "cliesp",
    version,
    about = "Append espanso matches or open the target match file/dir",
    after_help = "Configuration (highest precedence first):\n  \
        --match-file > env (CLIESP_*) > .env files > settings file > defaults\n  \
        Settings file: ~/.config/cliesp/settings.{yaml|yml|toml|json}\n  \
        Env vars: CLIESP_MATCH_DIR, CLIESP_MATCH_FILE, CLIESP_FILE_OPENER, \
        CLIESP_DIR_OPENER, CLIESP_MULTILINE_MODE"
)]
pub struct Cli {
    /// Path to the espanso match file (overrides config). Accepts a directory or full file path.
    #[arg(short = 'm', long, visible_alias = "matchFile", value_name = "PATH")]
    pub match_file: Option<String>,

    /// Open the resolved match file and exit.
    #[arg(short = 'o', long, conflicts_with = "open_dir")]
    pub open: bool,

    /// Open the resolved match directory and exit.
    #[arg(short = 'd', long, visible_alias = "openDir")]
    pub open_dir: bool,

    /// Directory holding settings.{yaml,yml,toml,json} (defaults to ~/.config/cliesp).
    #[arg(short = 'c', long, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Enable debug logging for config loading and path resolution.
    #[arg(long)]
    pub debug: bool,
}
