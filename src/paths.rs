//! Filesystem locations computed once at startup.

use std::path::{Path, PathBuf};

/// Well-known application directories.
///
/// Built once by [`PathsBuilder::resolve`] and read through
/// [`AppContext::paths`](crate::AppContext::paths).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    root: PathBuf,
    app: PathBuf,
    config: PathBuf,
    runtime: PathBuf,
    public: PathBuf,
}

impl Paths {
    /// Starts from `root`; every other directory defaults to a child of it.
    pub fn builder(root: impl AsRef<Path>) -> PathsBuilder {
        PathsBuilder {
            root: root.as_ref().to_path_buf(),
            app: None,
            config: None,
            runtime: None,
            public: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn app(&self) -> &Path {
        &self.app
    }

    pub fn config(&self) -> &Path {
        &self.config
    }

    pub fn runtime(&self) -> &Path {
        &self.runtime
    }

    pub fn public(&self) -> &Path {
        &self.public
    }
}

/// Collects directory overrides before [`resolve`](Self::resolve).
///
/// The first value given for a directory is kept; later calls for the same
/// directory are ignored.
#[derive(Debug, Clone)]
#[must_use = "builders do nothing until .resolve() is called"]
pub struct PathsBuilder {
    root: PathBuf,
    app: Option<PathBuf>,
    config: Option<PathBuf>,
    runtime: Option<PathBuf>,
    public: Option<PathBuf>,
}

impl PathsBuilder {
    pub fn app(mut self, path: impl Into<PathBuf>) -> Self {
        define(&mut self.app, "app", path.into());
        self
    }

    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        define(&mut self.config, "config", path.into());
        self
    }

    pub fn runtime(mut self, path: impl Into<PathBuf>) -> Self {
        define(&mut self.runtime, "runtime", path.into());
        self
    }

    pub fn public(mut self, path: impl Into<PathBuf>) -> Self {
        define(&mut self.public, "public", path.into());
        self
    }

    /// Fills in every directory that was not defined explicitly.
    pub fn resolve(self) -> Paths {
        let under_root =
            |dir: Option<PathBuf>, name: &str| dir.unwrap_or_else(|| self.root.join(name));
        Paths {
            app: under_root(self.app, "app"),
            config: under_root(self.config, "config"),
            runtime: under_root(self.runtime, "runtime"),
            public: under_root(self.public, "public"),
            root: self.root,
        }
    }
}

fn define(slot: &mut Option<PathBuf>, name: &str, path: PathBuf) {
    match slot {
        Some(existing) => {
            tracing::debug!(
                name,
                kept = %existing.display(),
                ignored = %path.display(),
                "path already defined"
            );
        }
        None => *slot = Some(path),
    }
}
