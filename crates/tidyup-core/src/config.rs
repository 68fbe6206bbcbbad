use crate::error::Error;
use crate::model::Category;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use glob::Pattern;
use serde::{Deserialize, Deserializer};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

const OWNER_READ: u32 = 0o400;
const MODE_VAR: &str = "TIDYUP_CANONICAL_MODE";

/// Process-wide settings, loaded once and passed by reference into the
/// scanner, classifier and orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directories to inventory. The first one is the primary directory.
    pub scan_dirs: Vec<PathBuf>,
    /// Permission bits every file is expected to carry.
    #[serde(deserialize_with = "deserialize_mode")]
    pub canonical_mode: u32,
    /// Path suffixes marking a file as temporary.
    pub temp_extensions: Vec<String>,
    /// Characters not allowed in file names.
    pub bad_chars: String,
    pub replace_char: char,
    /// Where the action snapshot is written and replayed from.
    pub actions_file: PathBuf,
    pub ignore_patterns: Vec<String>,
    /// Categories that automatic mode executes in addition to its fixed policy.
    pub auto_include: Vec<Category>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan_dirs: vec![PathBuf::from("x"), PathBuf::from("y1"), PathBuf::from("y2")],
            canonical_mode: 0o644,
            temp_extensions: vec![".tmp".to_string(), ".bak".to_string(), "~".to_string()],
            bad_chars: ":*?\"<>|# ".to_string(),
            replace_char: '_',
            actions_file: PathBuf::from("actions.json"),
            ignore_patterns: Vec::new(),
            auto_include: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn primary_dir(&self) -> &Path {
        self.scan_dirs
            .first()
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new("."))
    }

    pub fn is_bad_char(&self, c: char) -> bool {
        self.bad_chars.contains(c)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.scan_dirs.is_empty() {
            return Err(Error::InvalidConfig(
                "scan_dirs must name at least one directory".to_string(),
            ));
        }
        if self.is_bad_char(self.replace_char) {
            return Err(Error::InvalidConfig(format!(
                "replace_char {:?} is itself listed in bad_chars",
                self.replace_char
            )));
        }
        if self.temp_extensions.iter().any(String::is_empty) {
            return Err(Error::InvalidConfig(
                "temp_extensions must not contain an empty suffix".to_string(),
            ));
        }
        if self.canonical_mode > 0o7777 {
            return Err(Error::InvalidConfig(format!(
                "canonical_mode {:o} is not a permission mode",
                self.canonical_mode
            )));
        }
        if self.canonical_mode & OWNER_READ == 0 {
            return Err(Error::InvalidConfig(format!(
                "canonical_mode {:o} would leave files unreadable by their owner",
                self.canonical_mode
            )));
        }
        // The primary must survive overlap pruning, so nothing may contain it.
        let primary = comparable(self.primary_dir());
        for dir in self.scan_dirs.iter().skip(1) {
            if primary.starts_with(comparable(dir)) {
                return Err(Error::InvalidConfig(format!(
                    "scan dir {} repeats or contains the primary directory {}",
                    dir.display(),
                    self.primary_dir().display()
                )));
            }
        }
        for glob in &self.ignore_patterns {
            Pattern::new(glob).map_err(|e| {
                Error::InvalidConfig(format!("invalid ignore pattern '{}': {}", glob, e))
            })?;
        }
        Ok(())
    }
}

/// Defaults, then an optional `Tidyup.{toml,yaml,json}`, then `TIDYUP_*` variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_configuration_from(env::vars().collect())
}

fn load_configuration_from(vars: config::Map<String, String>) -> Result<AppConfig, ConfigError> {
    // try_parsing would turn "644" into the decimal 644; keep the mode as octal text.
    let mode = vars.get(MODE_VAR).cloned();

    let mut builder = Config::builder()
        .add_source(ConfigFile::with_name("Tidyup").required(false))
        .add_source(
            Environment::with_prefix("TIDYUP")
                .source(Some(vars))
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("scan_dirs")
                .with_list_parse_key("temp_extensions")
                .with_list_parse_key("ignore_patterns")
                .with_list_parse_key("auto_include"),
        );
    if let Some(mode) = mode {
        builder = builder.set_override("canonical_mode", mode)?;
    }
    builder.build()?.try_deserialize::<AppConfig>()
}

/// Remove directories that repeat or sit under another directory in the list.
/// Survivors keep their relative order; the first entry is kept whenever no
/// later entry contains it.
pub fn non_overlapping_directories(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut result: Vec<(PathBuf, PathBuf)> = Vec::new();

    for dir in dirs {
        let key = comparable(dir);
        if result.iter().any(|(kept, _)| key.starts_with(kept)) {
            continue;
        }
        result.retain(|(kept, _)| !kept.starts_with(&key));
        result.push((key, dir.clone()));
    }

    result.into_iter().map(|(_, dir)| dir).collect()
}

/// Canonical form when the directory exists, so `y1` and `./y1/` compare equal.
fn comparable(dir: &Path) -> PathBuf {
    fs::canonicalize(dir).unwrap_or_else(|_| {
        dir.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    })
}

/// Accepts either an integer (`420`, or `0o644` in TOML) or an octal string
/// (`"644"`, which is also how `TIDYUP_CANONICAL_MODE` arrives).
fn deserialize_mode<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMode {
        Number(u32),
        Octal(String),
    }

    match RawMode::deserialize(deserializer)? {
        RawMode::Number(mode) => Ok(mode),
        RawMode::Octal(text) => {
            let digits = text.trim().trim_start_matches("0o");
            u32::from_str_radix(digits, 8).map_err(serde::de::Error::custom)
        }
    }
}
