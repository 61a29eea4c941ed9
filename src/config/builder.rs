use std::path::Path;

use serde::de::DeserializeOwned;

use super::env::EnvSource;
use super::file::FileSource;
use super::resolve::resolve_references;
use super::settings::Settings;
use super::source::{merge_at_path, ConfigSource, InlineSource};
use super::ConfigError;

/// Builder for layered configuration.
///
/// Sources are merged in registration order, later ones overriding earlier
/// ones. Nested tables merge recursively; other values (arrays included) are
/// replaced entirely.
///
/// String values may reference other values with `${path.to.field}`:
///
/// ```toml
/// host = "example.com"
/// domain = ["${host}", "www.${host}"]
///
/// [namespace]
/// app = "/srv/${host}/app"
/// ```
///
/// `$$` escapes a literal `$`.
///
/// ## Example
///
/// ```no_run
/// use dragon_web::Config;
///
/// let settings = Config::builder()
///     .with_file("config/app.toml", true)
///     .with_env("APP", "__")
///     .with_file("config/local.toml", false)
///     .load()?;
///
/// let debug: bool = settings.get_or("debug", false);
/// # Ok::<(), dragon_web::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() or .load() is called"]
pub struct Config {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a TOML file. Missing optional files are skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Adds environment variables `PREFIX<sep>A<sep>B`, mapped to key `a.b`.
    ///
    /// Values are coerced to boolean, integer, float or string; a
    /// comma-separated value becomes an array.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Adds TOML text held in memory.
    pub fn with_toml_str(self, text: impl Into<String>) -> Self {
        self.with_source(InlineSource::new(text))
    }

    /// Adds any other source.
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Loads, merges and resolves all sources into a dotted-key [`Settings`] store.
    pub fn load(self) -> Result<Settings, ConfigError> {
        let mut merged = toml::Table::new();

        for source in &self.sources {
            for entry in source.entries()? {
                merge_at_path(&mut merged, &entry.path, entry.value);
            }
        }

        resolve_references(&mut merged)?;
        Ok(Settings::new(merged))
    }

    /// Loads the configuration and deserializes it into `T` once.
    pub fn build<T: DeserializeOwned>(self) -> Result<T, ConfigError> {
        self.load()?.deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_later_sources_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            debug = true
            [namespace]
            app = "src/app"
            "#
        )
        .unwrap();

        let settings = Config::builder()
            .with_toml_str(
                r#"
                debug = false
                timezone = "UTC"
                [namespace]
                core = "src/core"
                "#,
            )
            .with_file(file.path(), true)
            .load()
            .unwrap();

        assert_eq!(settings.get::<bool>("debug"), Some(true));
        assert_eq!(settings.get::<String>("timezone").as_deref(), Some("UTC"));
        assert!(settings.contains("namespace.app"));
        assert!(settings.contains("namespace.core"));
    }

    #[test]
    fn test_references_resolve_after_merge() {
        let settings = Config::builder()
            .with_toml_str(r#"domain = ["${host}"]"#)
            .with_toml_str(r#"host = "example.com""#)
            .load()
            .unwrap();

        assert_eq!(
            settings.get::<Vec<String>>("domain"),
            Some(vec!["example.com".to_string()])
        );
    }

    #[test]
    fn test_build_typed() {
        #[derive(Deserialize)]
        struct Site {
            name: String,
            debug: bool,
        }

        let site: Site = Config::builder()
            .with_toml_str("name = \"blog\"\ndebug = true")
            .build()
            .unwrap();

        assert_eq!(site.name, "blog");
        assert!(site.debug);
    }

    #[test]
    fn test_missing_required_file_fails() {
        let result = Config::builder()
            .with_file("/nonexistent/app.toml", true)
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
