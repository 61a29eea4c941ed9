//! Resolution of symbolic module names to locations on disk.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Receives the namespace map from the `namespace` config key.
pub trait Loader {
    fn set_namespace(&mut self, namespaces: &BTreeMap<String, PathBuf>);
}

/// Maps `::`-separated symbols to files through configured namespace roots.
///
/// `app::controller::Home` with `app = "/srv/site/app"` resolves to
/// `/srv/site/app/controller/Home.rs`. The longest matching namespace wins.
#[derive(Debug, Clone)]
pub struct NamespaceLoader {
    namespaces: BTreeMap<String, PathBuf>,
    extension: String,
}

impl Default for NamespaceLoader {
    fn default() -> Self {
        Self {
            namespaces: BTreeMap::new(),
            extension: "rs".to_string(),
        }
    }
}

impl NamespaceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the file extension appended to resolved paths.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn namespaces(&self) -> &BTreeMap<String, PathBuf> {
        &self.namespaces
    }

    pub fn resolve(&self, symbol: &str) -> Option<PathBuf> {
        let symbol = symbol.trim_start_matches("::");
        let (prefix, dir) = self
            .namespaces
            .iter()
            .filter(|(ns, _)| {
                symbol == ns.as_str()
                    || symbol
                        .strip_prefix(ns.as_str())
                        .is_some_and(|rest| rest.starts_with("::"))
            })
            .max_by_key(|(ns, _)| ns.len())?;

        let rest = symbol[prefix.len()..].trim_start_matches("::");
        if rest.is_empty() {
            return None;
        }

        let mut path = dir.clone();
        path.extend(rest.split("::"));
        path.set_extension(&self.extension);
        Some(path)
    }
}

impl Loader for NamespaceLoader {
    fn set_namespace(&mut self, namespaces: &BTreeMap<String, PathBuf>) {
        tracing::debug!(count = namespaces.len(), "namespace map configured");
        self.namespaces.extend(
            namespaces
                .iter()
                .map(|(ns, dir)| (ns.trim_matches(':').to_string(), dir.clone())),
        );
    }
}
