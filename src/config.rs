// Purpose: Load jspm-resolve settings from `jspm-resolve.toml` with environment overrides.
// Inputs/Outputs: Project root in, Config out; missing file means defaults.
// Invariants: Environment values win over the file; relative paths are resolved against the root.
// Gotchas: JSPM_RESOLVE_SILENT accepts "1"/"true"; anything else leaves logging on.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pkg::diag::DEFAULT_LOG_TITLE;
use crate::pkg::names::NameList;
use crate::pkg::tables::PACKAGES_MARKER;

pub const CONFIG_FILE: &str = "jspm-resolve.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub package_json: PathBuf,
    pub loader: PathBuf,
    pub packages_marker: String,
    pub log_title: String,
    pub silent: bool,
    pub top_level_filter: Option<NameList>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package_json: PathBuf::from("package.json"),
            loader: PathBuf::from("loader.json"),
            packages_marker: PACKAGES_MARKER.to_string(),
            log_title: DEFAULT_LOG_TITLE.to_string(),
            silent: false,
            top_level_filter: None,
        }
    }
}

impl Config {
    pub fn parse(toml_text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str::<Config>(toml_text)?)
    }

    /// Reads `<root>/jspm-resolve.toml` if present, then applies process env.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let path = root.join(CONFIG_FILE);
        let mut cfg = if path.exists() {
            let text =
                fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            Self::parse(&text).with_context(|| format!("parse {}", path.display()))?
        } else {
            Self::default()
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("JSPM_RESOLVE_SILENT") {
            self.silent = matches!(v.trim(), "1" | "true");
        }
        if let Some(v) = lookup("JSPM_RESOLVE_LOG_TITLE") {
            let v = v.trim();
            if !v.is_empty() {
                self.log_title = v.to_string();
            }
        }
        if let Some(v) = lookup("JSPM_RESOLVE_LOADER") {
            let v = v.trim();
            if !v.is_empty() {
                self.loader = PathBuf::from(v);
            }
        }
    }

    pub fn package_json_path(&self, root: &Path) -> PathBuf {
        root.join(&self.package_json)
    }

    pub fn loader_path(&self, root: &Path) -> PathBuf {
        root.join(&self.loader)
    }
}
