use std::path::{Path, PathBuf};

/// Execution context, decided once at startup and passed to path-aware
/// operations instead of being probed globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostContext {
    /// Filesystem available; `cwd` is the project working directory.
    Native { cwd: PathBuf },
    /// No filesystem; only the document base URI is known.
    Browser { base_uri: String },
}

impl HostContext {
    pub fn detect() -> anyhow::Result<Self> {
        Ok(Self::Native {
            cwd: std::env::current_dir()?,
        })
    }

    pub fn native(cwd: impl Into<PathBuf>) -> Self {
        Self::Native { cwd: cwd.into() }
    }

    pub fn browser(base_uri: impl Into<String>) -> Self {
        Self::Browser {
            base_uri: base_uri.into(),
        }
    }

    pub fn has_filesystem(&self) -> bool {
        matches!(self, Self::Native { .. })
    }

    pub fn cwd(&self) -> Option<&Path> {
        match self {
            Self::Native { cwd } => Some(cwd),
            Self::Browser { .. } => None,
        }
    }

    /// Root execution path with `/` separators and a trailing `/`.
    pub fn root_path(&self) -> String {
        match self {
            Self::Native { cwd } => {
                let mut s = cwd.to_string_lossy().replace('\\', "/");
                if !s.ends_with('/') {
                    s.push('/');
                }
                s
            }
            Self::Browser { base_uri } => {
                let s = base_uri.split('#').next().unwrap_or_default();
                let s = s.split('?').next().unwrap_or_default();
                match s.rfind('/') {
                    Some(i) => s[..=i].to_string(),
                    None => String::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_root_path_has_trailing_slash() {
        let h = HostContext::native("/work/app");
        assert!(h.has_filesystem());
        assert_eq!(h.root_path(), "/work/app/");
        assert_eq!(HostContext::native("/work/app/").root_path(), "/work/app/");
    }

    #[test]
    fn native_root_path_uses_forward_slashes() {
        let h = HostContext::native(r"C:\work\app");
        assert_eq!(h.root_path(), "C:/work/app/");
    }

    #[test]
    fn browser_root_path_strips_query_hash_and_file() {
        let h = HostContext::browser("http://localhost:8080/app/index.html?x=1#top");
        assert!(!h.has_filesystem());
        assert!(h.cwd().is_none());
        assert_eq!(h.root_path(), "http://localhost:8080/app/");
    }

    #[test]
    fn detect_is_native() {
        let h = HostContext::detect().expect("cwd");
        assert!(h.has_filesystem());
        assert!(h.root_path().ends_with('/'));
    }
}
