// Purpose: Snapshot of SystemJS/JSPM loader state (`config.js` after evaluation) plus name normalization.
// Inputs/Outputs: Reads a JSON snapshot; normalizes package names to absolute location URLs.
// Invariants: The snapshot is immutable once loaded; normalization performs no I/O.
// Gotchas: Registry-qualified names (`github:x/y@z`) parse as URLs, so paths rules must run before URL checks.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use url::Url;

/// Loader collaborator: top-level `map`, per-package `packages`, and
/// synchronous name normalization.
pub trait Loader {
    fn map(&self) -> &IndexMap<String, String>;
    fn packages(&self) -> &IndexMap<String, PackageRecord>;
    fn normalize_sync(&self, name: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    #[serde(default)]
    pub map: Option<IndexMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderState {
    #[serde(default, rename = "baseURL")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub map: IndexMap<String, String>,
    #[serde(default)]
    pub packages: IndexMap<String, PackageRecord>,
    #[serde(default)]
    pub paths: IndexMap<String, String>,
    #[serde(default = "default_js_extensions")]
    pub default_js_extensions: bool,
}

fn default_js_extensions() -> bool {
    true
}

impl Default for LoaderState {
    fn default() -> Self {
        Self {
            base_url: None,
            map: IndexMap::new(),
            packages: IndexMap::new(),
            paths: IndexMap::new(),
            default_js_extensions: true,
        }
    }
}

impl LoaderState {
    pub fn from_json(json_text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str::<LoaderState>(json_text)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parse loader state {}", path.display()))
    }

    fn apply_map(&self, name: &str) -> String {
        if let Some(target) = self.map.get(name) {
            return target.clone();
        }
        if let Some((head, rest)) = name.split_once('/')
            && let Some(target) = self.map.get(head)
        {
            return format!("{}/{}", target, rest);
        }
        name.to_string()
    }

    // Longest matching prefix wins, like SystemJS `paths`.
    fn apply_paths(&self, target: &str) -> String {
        let mut best: Option<(usize, String)> = None;
        for (pattern, replacement) in &self.paths {
            let candidate = match pattern.split_once('*') {
                Some((prefix, suffix)) => {
                    if target.len() < prefix.len() + suffix.len()
                        || !target.starts_with(prefix)
                        || !target.ends_with(suffix)
                    {
                        continue;
                    }
                    let wild = &target[prefix.len()..target.len() - suffix.len()];
                    (prefix.len(), replacement.replacen('*', wild, 1))
                }
                None if pattern == target => (pattern.len(), replacement.clone()),
                None => continue,
            };
            if best.as_ref().map(|(len, _)| *len < candidate.0).unwrap_or(true) {
                best = Some(candidate);
            }
        }
        best.map(|(_, s)| s).unwrap_or_else(|| target.to_string())
    }

    fn resolve_against_base(&self, location: &str) -> anyhow::Result<String> {
        if Url::parse(location).is_ok() {
            return Ok(location.to_string());
        }
        let Some(base) = self.base_url.as_deref() else {
            bail!("loader state has no baseURL to resolve '{}'", location);
        };
        let base = Url::parse(base).with_context(|| format!("invalid baseURL {}", base))?;
        let joined = base
            .join(location)
            .with_context(|| format!("resolve '{}' against {}", location, base))?;
        Ok(joined.to_string())
    }
}

impl Loader for LoaderState {
    fn map(&self) -> &IndexMap<String, String> {
        &self.map
    }

    fn packages(&self) -> &IndexMap<String, PackageRecord> {
        &self.packages
    }

    fn normalize_sync(&self, name: &str) -> anyhow::Result<String> {
        let mapped = self.apply_map(name);
        let located = self.apply_paths(&mapped);
        let mut out = self.resolve_against_base(&located)?;
        if self.default_js_extensions && !out.ends_with(".js") {
            out.push_str(".js");
        }
        Ok(out)
    }
}
