use std::collections::BTreeMap;
use std::path::{is_separator, Path, PathBuf};

use anyhow::{bail, Context, Result};
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::paths::{expand_home, DEFAULT_MATCH_DIR, DEFAULT_MATCH_FILE};

pub const ENV_PREFIX: &str = "CLIESP_";
pub const DEFAULT_ENV_FILES: [&str; 3] = [".env", ".env.local", ".env.production"];
const SETTINGS_EXTENSIONS: [&str; 4] = ["yaml", "yml", "toml", "json"];

/// Configurable fields. Empty strings mean "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub match_dir: String,
    pub match_file: String,
    /// Command used to open the match file. Falls back to `$EDITOR`, then `vim`.
    pub file_opener: String,
    /// Command used to open the match directory. Falls back to the platform opener.
    pub dir_opener: String,
    pub multiline_mode: String,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub settings_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MultilineMode {
    /// Enter on an empty line submits, single Enter adds a line.
    #[default]
    Messaging,
    /// A line reading `EOF` or end of input (Ctrl+D) submits.
    Eof,
}

impl MultilineMode {
    /// Unknown values fall back to [`MultilineMode::Eof`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "messaging" => MultilineMode::Messaging,
            _ => MultilineMode::Eof,
        }
    }
}

impl AppConfig {
    /// Built-in values used below every other configuration source.
    pub fn builtin() -> Self {
        Self {
            match_dir: DEFAULT_MATCH_DIR.to_string(),
            match_file: DEFAULT_MATCH_FILE.to_string(),
            multiline_mode: "messaging".to_string(),
            ..Self::default()
        }
    }

    pub fn multiline_mode(&self) -> MultilineMode {
        MultilineMode::parse(&self.multiline_mode)
    }

    pub fn validate(&self) -> Result<()> {
        if self.match_file.contains(is_separator) {
            bail!(
                "match_file must be a bare file name, got: {}",
                self.match_file
            );
        }

        if self.multiline_mode() == MultilineMode::Eof
            && !self.multiline_mode.trim().eq_ignore_ascii_case("eof")
        {
            warn!(
                multiline_mode = %self.multiline_mode,
                "unknown multiline mode, using eof"
            );
        }

        Ok(())
    }
}

/// Layers configuration sources, lowest precedence first: built-in defaults,
/// settings file, `.env` files, process environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: Option<PathBuf>,
    env_files: Vec<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_dir: default_config_dir(),
            env_files: DEFAULT_ENV_FILES.iter().map(PathBuf::from).collect(),
        }
    }

    /// Directory searched for `settings.{yaml,yml,toml,json}`.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// `.env` files to read. Earlier files win over later ones.
    pub fn with_env_files(mut self, files: Vec<PathBuf>) -> Self {
        self.env_files = files;
        self
    }

    pub fn load(&self) -> Result<LoadedConfig> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::builtin()));

        let settings_path = self.find_settings_file();
        if let Some(path) = &settings_path {
            debug!(path = %path.display(), "loading settings file");
            figment = merge_settings_file(figment, path);
        }

        let dotenv_values = self.read_env_files()?;
        debug!(count = dotenv_values.len(), "loaded values from .env files");

        let config: AppConfig = figment
            .merge(Serialized::defaults(dotenv_values))
            .merge(Serialized::defaults(read_process_env()))
            .extract()
            .context("failed to parse configuration")?;

        debug!(?config, "configuration loaded");
        Ok(LoadedConfig {
            config,
            settings_path,
        })
    }

    fn find_settings_file(&self) -> Option<PathBuf> {
        let Some(dir) = &self.config_dir else {
            debug!("no config directory available, skipping settings file");
            return None;
        };

        SETTINGS_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("settings.{ext}")))
            .find(|path| path.is_file())
    }

    fn read_env_files(&self) -> Result<BTreeMap<String, String>> {
        let mut values = BTreeMap::new();

        for path in &self.env_files {
            if !path.is_file() {
                continue;
            }

            let entries = dotenvy::from_path_iter(path)
                .with_context(|| format!("failed to read env file: {}", path.display()))?;
            for entry in entries {
                let (key, value) = entry
                    .with_context(|| format!("failed to parse env file: {}", path.display()))?;
                if let Some(name) = key.strip_prefix(ENV_PREFIX) {
                    values.entry(name.to_ascii_lowercase()).or_insert(value);
                }
            }
        }

        Ok(values)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_settings_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => figment.merge(Yaml::file(path)),
    }
}

/// `CLIESP_*` process variables, kept as plain strings.
fn read_process_env() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| {
            let name = key.to_str()?.strip_prefix(ENV_PREFIX)?;
            if name.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.into_string().ok()?))
        })
        .collect()
}

fn default_config_dir() -> Option<PathBuf> {
    expand_home("~/.config/cliesp").ok()
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigLoader, MultilineMode};
    use crate::core::paths::{DEFAULT_MATCH_DIR, DEFAULT_MATCH_FILE};
    use figment::Jail;
    use std::path::PathBuf;

    fn loader_in(jail: &Jail) -> ConfigLoader {
        ConfigLoader::new()
            .with_config_dir(jail.directory())
            .with_env_files(vec![
                PathBuf::from(".env"),
                PathBuf::from(".env.local"),
            ])
    }

    fn load(loader: &ConfigLoader) -> figment::Result<AppConfig> {
        loader
            .load()
            .map(|loaded| loaded.config)
            .map_err(|err| format!("{err:#}").into())
    }

    #[test]
    fn builtin_defaults_apply_without_sources() {
        Jail::expect_with(|jail| {
            let loaded = loader_in(jail).load().map_err(|err| err.to_string())?;

            assert!(loaded.settings_path.is_none());
            assert_eq!(loaded.config.match_dir, DEFAULT_MATCH_DIR);
            assert_eq!(loaded.config.match_file, DEFAULT_MATCH_FILE);
            assert_eq!(loaded.config.multiline_mode(), MultilineMode::Messaging);
            Ok(())
        });
    }

    #[test]
    fn loads_yaml_settings_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.yaml",
                "match_dir: /tmp/fromfile\nmatch_file: file.yml\nfile_opener: code -w\n",
            )?;

            let loaded = loader_in(jail).load().map_err(|err| err.to_string())?;
            assert_eq!(
                loaded.settings_path,
                Some(jail.directory().join("settings.yaml"))
            );
            assert_eq!(loaded.config.match_dir, "/tmp/fromfile");
            assert_eq!(loaded.config.match_file, "file.yml");
            assert_eq!(loaded.config.file_opener, "code -w");
            assert_eq!(loaded.config.multiline_mode, "messaging");
            Ok(())
        });
    }

    #[test]
    fn loads_toml_and_json_settings_files() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.toml", "match_dir = \"/tmp/toml\"\nmultiline_mode = \"eof\"\n")?;

            let config = load(&loader_in(jail))?;
            assert_eq!(config.match_dir, "/tmp/toml");
            assert_eq!(config.multiline_mode(), MultilineMode::Eof);
            Ok(())
        });

        Jail::expect_with(|jail| {
            jail.create_file("settings.json", r#"{"match_file": "json.yml"}"#)?;

            let config = load(&loader_in(jail))?;
            assert_eq!(config.match_file, "json.yml");
            assert_eq!(config.match_dir, DEFAULT_MATCH_DIR);
            Ok(())
        });
    }

    #[test]
    fn yaml_settings_take_priority_over_other_formats() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.yaml", "match_file: yaml.yml\n")?;
            jail.create_file("settings.json", r#"{"match_file": "json.yml"}"#)?;

            let config = load(&loader_in(jail))?;
            assert_eq!(config.match_file, "yaml.yml");
            Ok(())
        });
    }

    #[test]
    fn loads_values_from_env_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                ".env",
                "CLIESP_MATCH_DIR=/tmp/fromenv\nCLIESP_MATCH_FILE=env.yml\nOTHER_VAR=ignored\n",
            )?;

            let config = load(&loader_in(jail))?;
            assert_eq!(config.match_dir, "/tmp/fromenv");
            assert_eq!(config.match_file, "env.yml");
            assert!(std::env::var("CLIESP_MATCH_DIR").is_err());
            Ok(())
        });
    }

    #[test]
    fn earlier_env_file_wins_and_process_env_wins_over_all() {
        Jail::expect_with(|jail| {
            jail.create_file(".env", "CLIESP_MATCH_FILE=first.yml\nCLIESP_MATCH_DIR=/tmp/dotenv\n")?;
            jail.create_file(".env.local", "CLIESP_MATCH_FILE=second.yml\nCLIESP_DIR_OPENER=nautilus\n")?;
            jail.set_env("CLIESP_MATCH_DIR", "/tmp/process");

            let config = load(&loader_in(jail))?;
            assert_eq!(config.match_file, "first.yml");
            assert_eq!(config.dir_opener, "nautilus");
            assert_eq!(config.match_dir, "/tmp/process");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_settings_file_per_field() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.yaml",
                "match_dir: /tmp/fromfile\nmatch_file: file.yml\n",
            )?;
            jail.set_env("CLIESP_MATCH_DIR", "/tmp/fromenvvar");

            let config = load(&loader_in(jail))?;
            assert_eq!(config.match_dir, "/tmp/fromenvvar");
            assert_eq!(config.match_file, "file.yml");
            Ok(())
        });
    }

    #[test]
    fn env_values_that_look_like_scalars_stay_strings() {
        Jail::expect_with(|jail| {
            jail.set_env("CLIESP_MATCH_FILE", "2024");
            jail.set_env("CLIESP_MATCH_DIR", "true");

            let config = load(&loader_in(jail))?;
            assert_eq!(config.match_file, "2024");
            assert_eq!(config.match_dir, "true");
            Ok(())
        });
    }

    #[test]
    fn malformed_settings_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.json", "{not json")?;

            let err = loader_in(jail)
                .load()
                .expect_err("malformed settings should fail");
            assert!(err.to_string().contains("failed to parse configuration"));
            Ok(())
        });
    }

    #[test]
    fn validate_rejects_match_file_with_separator() {
        let cfg = AppConfig {
            match_file: "nested/file.yml".to_string(),
            ..AppConfig::builtin()
        };

        let err = cfg.validate().expect_err("path in match_file should fail");
        assert!(err.to_string().contains("bare file name"));
    }

    #[test]
    fn validate_accepts_builtin_config() {
        AppConfig::builtin()
            .validate()
            .expect("builtin config should be valid");
    }

    #[test]
    fn validate_accepts_every_multiline_mode_value() {
        for mode in ["", "messaging", "EOF", "typo"] {
            let cfg = AppConfig {
                multiline_mode: mode.to_string(),
                ..AppConfig::builtin()
            };
            cfg.validate().expect("multiline mode never fails validation");
        }
    }

    #[test]
    fn multiline_mode_parsing_falls_back_to_eof() {
        assert_eq!(MultilineMode::parse("messaging"), MultilineMode::Messaging);
        assert_eq!(MultilineMode::parse(""), MultilineMode::Messaging);
        assert_eq!(MultilineMode::parse("EOF"), MultilineMode::Eof);
        assert_eq!(MultilineMode::parse("invalid"), MultilineMode::Eof);
    }
}
