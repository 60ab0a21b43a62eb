//! Runtime configuration for tasktrack.
//!
//! Resolution order: **CLI flag > env var > config file > hardcoded default**.
//!
//! ```text
//! Field        Env Var            Config Key    Default
//! ──────────── ────────────────── ───────────── ─────────────
//! tasks_file   TASKTRACK_FILE     tasks_file    tasks.txt
//! log          TASKTRACK_LOG      log           warn
//! config_dir   TASKTRACK_DIR      —             ~/.tasktrack
//! ```
//!
//! The config file lives at `<config_dir>/config` and holds `key=value` lines.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::{env, fs};

/// Task file used when nothing else is configured, relative to the working directory.
pub const DEFAULT_TASKS_FILE: &str = "tasks.txt";

/// Default tracing filter: warnings (e.g. skipped lines) and above.
pub const DEFAULT_LOG: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the optional `config` file.
    pub config_dir: PathBuf,
    /// The flat task store.
    pub tasks_file: PathBuf,
    /// `tracing` filter directive for stderr diagnostics.
    pub log: String,
}

impl Config {
    /// Load config from env vars, the config file, and hardcoded defaults.
    pub fn load() -> Result<Self> {
        Self::load_with_env(|k| env::var(k).ok())
    }

    fn load_with_env(get_env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config_dir = get_env("TASKTRACK_DIR")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_config_dir(&get_env));
        let mut cfg = Self::defaults(&config_dir);

        // 1. Config file overrides
        let config_file = config_dir.join("config");
        if config_file.exists() {
            parse_config_file(&config_file, |key, value| cfg.apply_file_entry(key, value))?;
        }

        // 2. Env var overrides (env wins over file)
        cfg.apply_env_overrides(&get_env);

        Ok(cfg)
    }

    fn defaults(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            tasks_file: PathBuf::from(DEFAULT_TASKS_FILE),
            log: DEFAULT_LOG.to_string(),
        }
    }

    fn apply_file_entry(&mut self, key: &str, value: &str) {
        match key {
            "tasks_file" if !value.is_empty() => self.tasks_file = PathBuf::from(value),
            "log" if !value.is_empty() => self.log = value.to_string(),
            _ => {}
        }
    }

    fn apply_env_overrides(&mut self, get_env: &impl Fn(&str) -> Option<String>) {
        if let Some(v) = get_env("TASKTRACK_FILE").filter(|s| !s.is_empty()) {
            self.tasks_file = PathBuf::from(v);
        }
        if let Some(v) = get_env("TASKTRACK_LOG").filter(|s| !s.is_empty()) {
            self.log = v;
        }
    }

    /// Apply a `--file` flag from the command line (highest precedence).
    pub fn with_tasks_file(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.tasks_file = path;
        }
        self
    }
}

/// `~/.tasktrack`, or `.tasktrack` when `HOME` is unset.
fn default_config_dir(get_env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    match get_env("HOME") {
        Some(home) => PathBuf::from(home).join(".tasktrack"),
        None => PathBuf::from(".tasktrack"),
    }
}

/// Parse a `key=value` config file, calling `f` for each entry.
///
/// Lines starting with `#` and empty lines are skipped.
fn parse_config_file(path: &Path, mut f: impl FnMut(&str, &str)) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            f(k.trim(), v.trim());
        }
    }
    Ok(())
}
