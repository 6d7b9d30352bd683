// Purpose: Turn a package name into its on-disk JSPM package location and project-relative path.
// Inputs/Outputs: Uses Loader::normalize_sync plus a FileSystem existence check; returns NormalizedPackage.
// Invariants: Every skip path returns None and reports why; nothing here panics or errors out.
// Gotchas: The base name keeps its `@ref` suffix; only the final `.js` extension is dropped.

use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::pkg::diag::Reporter;
use crate::pkg::host::HostContext;
use crate::pkg::loader::Loader;
use crate::pkg::tables::PACKAGES_MARKER;

pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPackage {
    pub package_name: String,
    pub actual_package_name: String,
    pub is_dependency: bool,
    pub full_path: PathBuf,
    pub relative_path: PathBuf,
    pub is_alias: bool,
}

/// Post-processing hook; an `Err` rejects the package.
pub type PackageHook<'h> =
    dyn Fn(NormalizedPackage, &Reporter<'_>) -> anyhow::Result<NormalizedPackage> + 'h;

pub struct PackageNormalizer<'a, L: Loader, F: FileSystem> {
    loader: &'a L,
    host: &'a HostContext,
    fs: &'a F,
    marker: &'a str,
    root_path: Option<PathBuf>,
    hook: Option<&'a PackageHook<'a>>,
}

impl<'a, L: Loader, F: FileSystem> PackageNormalizer<'a, L, F> {
    pub fn new(loader: &'a L, host: &'a HostContext, fs: &'a F) -> Self {
        Self {
            loader,
            host,
            fs,
            marker: PACKAGES_MARKER,
            root_path: None,
            hook: None,
        }
    }

    pub fn root_path(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_path = Some(root.into());
        self
    }

    pub fn marker(mut self, marker: &'a str) -> Self {
        self.marker = marker;
        self
    }

    pub fn hook(mut self, hook: &'a PackageHook<'a>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn normalize(&self, package_name: &str, rep: &Reporter) -> Option<NormalizedPackage> {
        if !self.host.has_filesystem() {
            rep.warn("normalize_package is not available in the browser environment.");
            return None;
        }

        let root = absolute_root(
            self.root_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(self.host.root_path())),
        );

        let normalized = match self.loader.normalize_sync(package_name) {
            Ok(n) => n,
            Err(err) => {
                rep.warn(format!(
                    "could not normalize '{}': {:#}",
                    package_name, err
                ));
                return None;
            }
        };

        // `@` marks a registry-qualified reference like `github:org/repo@master`.
        let is_dependency = package_name.contains('@');

        let store = self.marker.trim_end_matches('/');
        if store.is_empty() || !normalized.contains(store) {
            rep.warn(format!(
                "Warning: skipping '{}' as it does not appear to be a JSPM package.",
                package_name
            ));
            return None;
        }

        let location = location_path(&normalized);
        let (Some(dir), Some(stem)) = (
            location.parent(),
            location.file_stem().and_then(|s| s.to_str()),
        ) else {
            rep.warn(format!(
                "could not parse location '{}' for JSPM package '{}'",
                normalized, package_name
            ));
            return None;
        };

        let full_path = dir.join(stem);
        let relative_path = pathdiff::diff_paths(dir, &root)
            .unwrap_or_else(|| dir.to_path_buf())
            .join(stem);
        let actual_package_name = stem.split('@').next().unwrap_or_default().to_string();

        if !self.fs.exists(&full_path) {
            rep.warn(format!(
                "full path generated '{}' does not exist for JSPM package '{}'",
                full_path.display(),
                package_name
            ));
            return None;
        }

        let name = if is_dependency {
            actual_package_name.clone()
        } else {
            package_name.to_string()
        };
        let is_alias = name != actual_package_name;

        let result = NormalizedPackage {
            package_name: name,
            actual_package_name,
            is_dependency,
            full_path,
            relative_path,
            is_alias,
        };

        match self.hook {
            None => Some(result),
            Some(hook) => match hook(result, rep) {
                Ok(r) => Some(r),
                Err(err) => {
                    rep.warn(format!("{:#} for JSPM package '{}'", err, package_name));
                    None
                }
            },
        }
    }
}

/// Free-function form of [`PackageNormalizer::normalize`].
pub fn normalize_package<L: Loader, F: FileSystem>(
    loader: &L,
    host: &HostContext,
    fs: &F,
    package_name: &str,
    root_path: Option<&Path>,
    rep: &Reporter,
) -> Option<NormalizedPackage> {
    let mut n = PackageNormalizer::new(loader, host, fs);
    if let Some(root) = root_path {
        n = n.root_path(root);
    }
    n.normalize(package_name, rep)
}

// Relative roots are taken from the working directory, as the location URLs are absolute.
fn absolute_root(root: PathBuf) -> PathBuf {
    if root.is_absolute() {
        return root;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(root),
        Err(_) => root,
    }
}

fn location_path(normalized: &str) -> PathBuf {
    match Url::parse(normalized) {
        Ok(u) if u.scheme() == "file" => u
            .to_file_path()
            .unwrap_or_else(|_| PathBuf::from(u.path())),
        Ok(u) => PathBuf::from(u.path()),
        Err(_) => PathBuf::from(normalized),
    }
}
